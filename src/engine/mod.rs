//! Engine: the text compositor.
//!
//! Turns a string into a `TextMatrix`: glyphs laid out left to right with a
//! single blank column between neighbours.
//!
//! The engine is pure. It knows nothing about departures, terminals or
//! colours, and it reads only the static font table.

pub mod font;
pub mod normalize;

use crate::types::{GLYPH_HEIGHT, GLYPH_WIDTH, TextMatrix};

pub use normalize::normalize;

pub struct Engine;

impl Engine {
    /// Normalize `text` and compose it into a dot-matrix.
    pub fn compose(text: &str) -> TextMatrix {
        Self::compose_normalized(&normalize(text))
    }

    /// Compose text that is already normalized. Characters without a glyph
    /// contribute a blank 5-column block.
    pub fn compose_normalized(text: &str) -> TextMatrix {
        let width = text_width(text);
        let mut rows: [Vec<u8>; GLYPH_HEIGHT] = Default::default();
        for row in rows.iter_mut() {
            row.reserve_exact(width);
        }

        for (i, ch) in text.chars().enumerate() {
            let glyph = font::glyph(ch);
            for (row, pixels) in rows.iter_mut().zip(glyph.iter()) {
                if i > 0 {
                    row.push(0); // inter-character spacing
                }
                row.extend_from_slice(pixels);
            }
        }

        TextMatrix::from_rows(rows)
    }
}

/// Width in pixel columns of `text` once composed, including 1-column
/// spacing between characters.
pub fn text_width(text: &str) -> usize {
    match text.chars().count() {
        0 => 0,
        n => n * GLYPH_WIDTH + (n - 1),
    }
}
