/*
Key Glyphs
==========

Pure rendering of one key as box-drawing text. Each key produces an upper
block (8 rows, where black and white keys interlock) and a lower block
(5 rows, white keys only). Laying the blocks of every key side by side in
position order draws the whole keyboard with one continuous outer border:

    ┌──┬───┬┬───┬──┬──┬───┬┬───┬┬───┬──┐
    │  │   ││   │  │  │   ││   ││   │  │
    │  │   ││   │  │  │   ││   ││   │  │
    ...
    │  └─┬─┘└─┬─┘  │  └─┬─┘└─┬─┘└─┬─┘  │
    │    │    │    │    │    │    │    │
    ...
    └────┴────┴────┴────┴────┴────┴────┘

Widths per octave add up to 35 columns in both halves (7 white keys x 5),
plus one extra column for the right edge on the last key.
*/

use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

use crate::layout::{CornerRole, Key, KeyShape};

/// Rows in the upper (interlocking) part of a key
pub const UPPER_HEIGHT: u16 = 8;
/// Rows in the lower (white keys only) part of a key
pub const LOWER_HEIGHT: u16 = 5;

const SHARP_FILL: u16 = 3;
const NOTCH_FILL: u16 = 2;
const LOWER_FILL: u16 = 4;

const NATURAL_BG: Color = Color::White;
const SHARP_BG: Color = Color::Black;
const HIGHLIGHT_BG: Color = Color::Red;

/// A fixed-size block of styled rows for one key
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBlock {
    pub width: u16,
    pub lines: Vec<Line<'static>>,
}

impl GlyphBlock {
    pub fn height(&self) -> u16 {
        self.lines.len() as u16
    }

    /// Rows as plain strings, styles dropped
    pub fn plain(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }
}

/// Upper and lower glyphs of a single key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyGlyphs {
    pub upper: GlyphBlock,
    pub lower: GlyphBlock,
}

/// Render both parts of `key`
pub fn render_key(key: &Key, corner: CornerRole, highlight: bool) -> KeyGlyphs {
    KeyGlyphs {
        upper: render_upper(key.shape, corner, highlight),
        lower: render_lower(key.shape, corner, highlight),
    }
}

/// Fill style for a key part
pub fn fill_style(shape: KeyShape, highlight: bool) -> Style {
    let bg = match (highlight, shape) {
        (true, _) => HIGHLIGHT_BG,
        (false, KeyShape::Sharp) => SHARP_BG,
        (false, _) => NATURAL_BG,
    };
    Style::default().bg(bg)
}

fn upper_fill(shape: KeyShape, corner: CornerRole) -> u16 {
    match shape {
        KeyShape::Sharp => SHARP_FILL,
        KeyShape::NotchBoth => 0,
        // Nothing to the right of a closing C or F, so it takes the sharp's room too
        KeyShape::NotchRight if corner == CornerRole::Last => NOTCH_FILL * 2,
        KeyShape::NotchRight | KeyShape::NotchLeft => NOTCH_FILL,
    }
}

/// Width of the upper block, without rendering it
pub fn upper_width(shape: KeyShape, corner: CornerRole) -> u16 {
    let right_edge = (!shape.is_sharp() && corner == CornerRole::Last) as u16;
    1 + upper_fill(shape, corner) + right_edge
}

/// Width of the lower block, without rendering it
pub fn lower_width(shape: KeyShape, corner: CornerRole) -> u16 {
    match (shape, corner) {
        (KeyShape::Sharp, _) => 0,
        (_, CornerRole::Last) => 1 + LOWER_FILL + 1,
        _ => 1 + LOWER_FILL,
    }
}

fn row(left: &str, fill: u16, style: Style, right: &str) -> Line<'static> {
    let mut spans = vec![Span::raw(left.to_string())];
    if fill > 0 {
        spans.push(Span::styled(" ".repeat(fill as usize), style));
    }
    if !right.is_empty() {
        spans.push(Span::raw(right.to_string()));
    }
    Line::from(spans)
}

/// Render the 8-row upper part of a key
pub fn render_upper(shape: KeyShape, corner: CornerRole, highlight: bool) -> GlyphBlock {
    let style = fill_style(shape, highlight);
    let fill = upper_fill(shape, corner);
    let body_rows = UPPER_HEIGHT as usize - 2;

    let lines = if shape.is_sharp() {
        // Sharps never sit on the outer border
        let mut lines = Vec::with_capacity(UPPER_HEIGHT as usize);
        lines.push(Line::raw("┬───"));
        lines.extend((0..body_rows).map(|_| row("│", fill, style, "")));
        lines.push(Line::raw("└─┬─"));
        lines
    } else {
        let last = corner == CornerRole::Last;
        let top_left = if corner == CornerRole::First { "┌" } else { "┬" };
        let top_right = if last { "┐" } else { "" };
        let edge = if last { "│" } else { "" };
        let bottom_left = match shape {
            KeyShape::NotchRight => "│",
            _ => "╯",
        };

        let mut lines = Vec::with_capacity(UPPER_HEIGHT as usize);
        lines.push(Line::raw(format!(
            "{}{}{}",
            top_left,
            "─".repeat(fill as usize),
            top_right
        )));
        lines.extend((0..body_rows).map(|_| row("│", fill, style, edge)));
        lines.push(row(bottom_left, fill, style, edge));
        lines
    };

    GlyphBlock {
        width: upper_width(shape, corner),
        lines,
    }
}

/// Render the 5-row lower part of a key. Sharps have none.
pub fn render_lower(shape: KeyShape, corner: CornerRole, highlight: bool) -> GlyphBlock {
    let width = lower_width(shape, corner);
    if shape.is_sharp() {
        return GlyphBlock {
            width,
            lines: (0..LOWER_HEIGHT).map(|_| Line::default()).collect(),
        };
    }

    let style = fill_style(shape, highlight);
    let last = corner == CornerRole::Last;
    let edge = if last { "│" } else { "" };
    let bottom = format!(
        "{}{}{}",
        if corner == CornerRole::First { "└" } else { "┴" },
        "─".repeat(LOWER_FILL as usize),
        if last { "┘" } else { "" }
    );

    let mut lines: Vec<Line<'static>> = (0..LOWER_HEIGHT - 1)
        .map(|_| row("│", LOWER_FILL, style, edge))
        .collect();
    lines.push(Line::raw(bottom));

    GlyphBlock { width, lines }
}
