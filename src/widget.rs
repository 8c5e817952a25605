//! A single key on screen: its highlight flag and cached glyphs

use crate::layout::{CornerRole, Key};
use crate::render::{render_key, KeyGlyphs};

#[derive(Debug, Clone)]
pub struct KeyWidget {
    key: Key,
    corner: CornerRole,
    highlight: bool,
    glyphs: KeyGlyphs,
}

impl KeyWidget {
    pub fn new(key: Key, corner: CornerRole) -> Self {
        let glyphs = render_key(&key, corner, false);
        Self {
            key,
            corner,
            highlight: false,
            glyphs,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn corner(&self) -> CornerRole {
        self.corner
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight
    }

    pub fn glyphs(&self) -> &KeyGlyphs {
        &self.glyphs
    }

    /// Only the grid changes highlights, so they always match what is sounding.
    /// Returns true if the flag changed.
    pub(crate) fn set_highlight(&mut self, highlight: bool) -> bool {
        if self.highlight == highlight {
            return false;
        }
        self.highlight = highlight;
        self.rerender();
        true
    }

    fn rerender(&mut self) {
        self.glyphs = render_key(&self.key, self.corner, self.highlight);
    }
}
