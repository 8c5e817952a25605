//! tpiano - a piano keyboard in the terminal
//!
//! Run with: cargo run --bin tpiano -- --keymap tracker

mod app;
mod ui;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;
use tui_piano::input::Keymap;
use tui_piano::{PianoConfig, PlaySettings};

use app::App;

#[derive(Parser, Debug)]
#[command(author, version, about = "A piano keyboard in your terminal")]
struct Args {
    /// Number of octaves drawn
    #[arg(long, default_value_t = 5)]
    octaves: u8,
    /// Octave number of the leftmost C
    #[arg(long, default_value_t = 3)]
    first_octave: u8,
    /// Draw one more C on the right
    #[arg(long)]
    closing_c: bool,
    /// Computer keyboard layout
    #[arg(long, value_enum, default_value_t = KeymapArg::Home)]
    keymap: KeymapArg,
    /// Drawn octave (0-based) where the keymap starts
    #[arg(long, default_value_t = 1)]
    keymap_octave: u8,
    /// Milliseconds before a key without a release is let go
    #[arg(long, default_value_t = 600)]
    release_ms: u64,
    #[arg(long, default_value_t = 100)]
    velocity: u8,
    /// General MIDI program (0-127)
    #[arg(long, default_value_t = 0)]
    program: u8,
    /// Octave shift applied to every note (-3..=3)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    octave: i8,
    /// Semitone shift applied to every note (-11..=11)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    transpose: i8,
    /// Slots in the playback queue
    #[arg(long, default_value_t = 256)]
    queue_capacity: usize,
    /// Write logs here (RUST_LOG picks the level)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeymapArg {
    Home,
    Tracker,
}

impl From<KeymapArg> for Keymap {
    fn from(arg: KeymapArg) -> Self {
        match arg {
            KeymapArg::Home => Keymap::Home,
            KeymapArg::Tracker => Keymap::Tracker,
        }
    }
}

impl Args {
    fn config(&self) -> PianoConfig {
        PianoConfig {
            first_octave: self.first_octave,
            octaves: self.octaves,
            closing_c: self.closing_c,
            keymap: self.keymap.into(),
            keymap_octave: self.keymap_octave,
            release_after_ms: self.release_ms,
            velocity: self.velocity,
            program: self.program,
            settings: PlaySettings::new(self.octave, self.transpose),
            queue_capacity: self.queue_capacity,
        }
    }
}

/// The terminal belongs to the UI, so logs only go to a file
fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tui_piano=debug,tpiano=debug,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = args.config();
    tracing::info!(?config, "starting");

    let mut app = App::new(&config).wrap_err("invalid piano configuration")?;
    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result
}
