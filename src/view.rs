//! Keyboard view - assembles key glyphs into one image and maps screen cells
//! back to keys for pointer input

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::Widget,
};

use crate::grid::KeyboardGrid;
use crate::io::PlaybackDispatcher;
use crate::layout::{CornerRole, KeyShape, KeyboardLayout};
use crate::render::{lower_width, upper_width, GlyphBlock, LOWER_HEIGHT, UPPER_HEIGHT};

/// Total rows of the keyboard image
pub const KEYBOARD_HEIGHT: u16 = UPPER_HEIGHT + LOWER_HEIGHT;

/// Column range `[start, start + width)` covered by one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    start: u16,
    width: u16,
    position: usize,
}

/// Where each key sits in the keyboard image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitMap {
    upper: Vec<Columns>,
    lower: Vec<Columns>,
    width: u16,
}

impl HitMap {
    pub fn new(layout: &KeyboardLayout) -> Self {
        let upper = columns(layout, upper_width);
        let lower = columns(layout, lower_width);
        let width = upper.last().map(|c| c.start + c.width).unwrap_or(0);
        Self { upper, lower, width }
    }

    /// Width of the keyboard image in columns
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        KEYBOARD_HEIGHT
    }

    /// Leftmost column of a key's upper block
    pub fn column_of(&self, position: usize) -> Option<u16> {
        self.upper
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.start)
    }

    /// Key under a cell, in image coordinates
    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        let columns = if row < UPPER_HEIGHT {
            &self.upper
        } else if row < KEYBOARD_HEIGHT {
            &self.lower
        } else {
            return None;
        };

        columns
            .iter()
            .find(|c| column >= c.start && column < c.start + c.width)
            .map(|c| c.position)
    }

    /// Key under a screen cell, given where the image was drawn
    pub fn hit_in(&self, area: Rect, scroll: u16, column: u16, row: u16) -> Option<usize> {
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return None;
        }
        self.hit(column - area.x + scroll, row - area.y)
    }
}

fn columns(layout: &KeyboardLayout, width_of: fn(KeyShape, CornerRole) -> u16) -> Vec<Columns> {
    let mut x = 0u16;
    let mut columns = Vec::new();
    for key in layout.keys() {
        let width = width_of(key.shape, layout.corner(key.position));
        // Sharps have no lower part
        if width > 0 {
            columns.push(Columns {
                start: x,
                width,
                position: key.position,
            });
        }
        x += width;
    }
    columns
}

/// Renders a [`KeyboardGrid`] with every key in its current highlight state
pub struct KeyboardView<'a, D: PlaybackDispatcher> {
    grid: &'a KeyboardGrid<D>,
    scroll: u16,
}

impl<'a, D: PlaybackDispatcher> KeyboardView<'a, D> {
    pub fn new(grid: &'a KeyboardGrid<D>) -> Self {
        Self { grid, scroll: 0 }
    }

    /// Skip this many columns on the left, for terminals narrower than the keyboard
    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    /// Draw the full image into its own buffer
    pub fn image(&self) -> Buffer {
        let width: u16 = self
            .grid
            .widgets()
            .iter()
            .map(|w| w.glyphs().upper.width)
            .sum();
        let mut image = Buffer::empty(Rect::new(0, 0, width, KEYBOARD_HEIGHT));

        let mut upper_x = 0;
        let mut lower_x = 0;
        for widget in self.grid.widgets() {
            let glyphs = widget.glyphs();
            blit(&mut image, upper_x, 0, &glyphs.upper);
            blit(&mut image, lower_x, UPPER_HEIGHT, &glyphs.lower);
            upper_x += glyphs.upper.width;
            lower_x += glyphs.lower.width;
        }
        image
    }
}

fn blit(buf: &mut Buffer, x: u16, y: u16, block: &GlyphBlock) {
    if block.width == 0 {
        return;
    }
    for (row, line) in block.lines.iter().enumerate() {
        buf.set_line(x, y + row as u16, line, block.width);
    }
}

impl<D: PlaybackDispatcher> Widget for KeyboardView<'_, D> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let image = self.image();
        let image_area = image.area;

        for row in 0..area.height.min(image_area.height) {
            for col in 0..area.width {
                let src_x = col + self.scroll;
                if src_x >= image_area.width {
                    break;
                }
                buf[(area.x + col, area.y + row)] = image[(src_x, row)].clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MidiEvent;
    use crate::note::PlaySettings;

    fn grid() -> KeyboardGrid<Vec<MidiEvent>> {
        KeyboardGrid::new(KeyboardLayout::default(), Vec::new())
    }

    fn row_text(buf: &Buffer, y: u16, width: u16) -> String {
        (0..width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn hit_map_matches_glyph_widths() {
        let layout = KeyboardLayout::default();
        let map = HitMap::new(&layout);
        assert_eq!(map.width(), 176);

        // C3 upper: 3 columns, C#3: 4 columns, D3: 1 column
        assert_eq!(map.hit(0, 0), Some(0));
        assert_eq!(map.hit(2, 3), Some(0));
        assert_eq!(map.hit(3, 3), Some(1));
        assert_eq!(map.hit(6, 3), Some(1));
        assert_eq!(map.hit(7, 3), Some(2));
        assert_eq!(map.column_of(3), Some(8));
    }

    #[test]
    fn lower_rows_hit_only_naturals() {
        let map = HitMap::new(&KeyboardLayout::default());
        assert_eq!(map.hit(0, UPPER_HEIGHT), Some(0));
        assert_eq!(map.hit(4, UPPER_HEIGHT + 2), Some(0));
        assert_eq!(map.hit(5, UPPER_HEIGHT), Some(2));
        assert_eq!(map.hit(10, UPPER_HEIGHT), Some(4));
        assert_eq!(map.hit(175, UPPER_HEIGHT), Some(59));
        assert_eq!(map.hit(176, UPPER_HEIGHT), None);
        assert_eq!(map.hit(0, KEYBOARD_HEIGHT), None);
    }

    #[test]
    fn hit_in_screen_area() {
        let map = HitMap::new(&KeyboardLayout::default());
        let area = Rect::new(10, 5, 40, KEYBOARD_HEIGHT);
        assert_eq!(map.hit_in(area, 0, 10, 5), Some(0));
        assert_eq!(map.hit_in(area, 0, 9, 5), None);
        assert_eq!(map.hit_in(area, 35, 10, 5 + UPPER_HEIGHT), Some(12));
    }

    #[test]
    fn image_draws_the_border() {
        let image = KeyboardView::new(&grid()).image();
        assert_eq!(image.area.width, 176);
        let top = row_text(&image, 0, 14);
        assert_eq!(top, "┌──┬───┬┬───┬─");
        let bottom = row_text(&image, KEYBOARD_HEIGHT - 1, 11);
        assert_eq!(bottom, "└────┴────┴");
        assert_eq!(image[(175, 0)].symbol(), "┐");
        assert_eq!(image[(175, KEYBOARD_HEIGHT - 1)].symbol(), "┘");
    }

    #[test]
    fn pressed_keys_render_highlighted() {
        let mut grid = grid();
        grid.press(0, &PlaySettings::default());
        let image = KeyboardView::new(&grid).image();
        assert_eq!(image[(1, 1)].bg, ratatui::style::Color::Red);
        assert_eq!(image[(1, UPPER_HEIGHT)].bg, ratatui::style::Color::Red);
        assert_eq!(image[(6, UPPER_HEIGHT)].bg, ratatui::style::Color::White);
    }

    #[test]
    fn widget_render_scrolls() {
        let grid = grid();
        let area = Rect::new(0, 0, 10, KEYBOARD_HEIGHT);
        let mut buf = Buffer::empty(area);
        KeyboardView::new(&grid).scroll(3).render(area, &mut buf);
        assert_eq!(row_text(&buf, 0, 5), "┬───┬");
    }
}
