//! Shared boundary types for the departure board.
//!
//! This module defines the data contracts between the stages:
//! - Engine → Board: `TextMatrix`, the composed pixels of one line of text
//! - Board → Renderer (in-memory): `ResolvedScene` containing `DrawOp`s
//! - Renderer → Player: `Grid`s of `Cell`s and the `Frame`s between them

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Dot-matrix primitives
// ---------------------------------------------------------------------------

/// Rows in every glyph and every composed line.
pub const GLYPH_HEIGHT: usize = 7;

/// Columns in every glyph.
pub const GLYPH_WIDTH: usize = 5;

/// A single character's pixels, `glyph[row][col]`, each `0` (unlit) or `1` (lit).
pub type Glyph = [[u8; GLYPH_WIDTH]; GLYPH_HEIGHT];

/// The pixels of a composed line of text.
///
/// Always exactly `GLYPH_HEIGHT` rows, all of the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextMatrix {
    rows: [Vec<u8>; GLYPH_HEIGHT],
}

impl TextMatrix {
    /// Build a matrix from rows. Callers guarantee equal row lengths.
    pub(crate) fn from_rows(rows: [Vec<u8>; GLYPH_HEIGHT]) -> Self {
        debug_assert!(
            rows.iter().all(|row| row.len() == rows[0].len()),
            "text matrix rows have inconsistent widths",
        );
        Self { rows }
    }

    pub fn height(&self) -> usize {
        GLYPH_HEIGHT
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn rows(&self) -> &[Vec<u8>; GLYPH_HEIGHT] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.rows[row]
    }
}

/// `#` for lit pixels, `.` for unlit ones, one line per row.
impl fmt::Display for TextMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for &px in row {
                f.write_str(if px != 0 { "#" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

// ---------------------------------------------------------------------------
// Board → Renderer boundary (in-memory only, never serialized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DrawOp {
    pub x: u16,
    pub y: u16,
    pub ch: char,
    pub style: Style,
    pub z_order: i32,
}

#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub width: u16,
    pub height: u16,
    pub ops: Vec<DrawOp>,
}

// ---------------------------------------------------------------------------
// Renderer → Player boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

/// A rasterized screen, `grid[y][x]`.
pub type Grid = Vec<Vec<Cell>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone)]
pub enum Frame {
    Full { cells: Grid },
    Diff { changes: Vec<CellChange> },
}
