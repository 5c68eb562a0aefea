//! Board: the departure-board compiler.
//!
//! Turns departures into fixed-width lines, composes each line into a
//! `TextMatrix`, and lays the result out as a `ResolvedScene`: the stop name
//! on top, one pixel per cell for every line, and the stop id underneath.

pub mod departures;
pub mod layout;
pub mod stops;

use crate::config::Theme;
use crate::engine::Engine;
use crate::types::{DrawOp, GLYPH_HEIGHT, ResolvedScene, Style, TextMatrix};

use departures::Departure;
use layout::{EMPTY_BOARD, MAX_LINES};

/// Rows above the first line: the stop name and a spacer.
const HEADER_ROWS: usize = 2;

/// Rows between two lines.
const LINE_GAP: usize = 1;

#[derive(Debug, Clone)]
pub struct BoardLine {
    pub text: String,
    pub matrix: TextMatrix,
    /// Due now; the line blinks.
    pub arriving: bool,
    pub night: bool,
}

impl BoardLine {
    fn new(text: String, arriving: bool, night: bool) -> Self {
        let matrix = Engine::compose(&text);
        Self {
            text,
            matrix,
            arriving,
            night,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    pub stop_id: String,
    pub stop_name: String,
    pub lines: Vec<BoardLine>,
}

impl Board {
    /// Build the board for the first `MAX_LINES` departures, or a single
    /// `NINCS JARAT` line when there are none.
    pub fn build(
        stop_id: &str,
        stop_name: &str,
        departures: &[Departure],
        direction_width: usize,
    ) -> Self {
        let lines = if departures.is_empty() {
            vec![BoardLine::new(EMPTY_BOARD.to_string(), false, false)]
        } else {
            departures
                .iter()
                .take(MAX_LINES)
                .map(|d| {
                    BoardLine::new(
                        layout::format_line(d, direction_width),
                        d.is_arriving(),
                        d.is_night_bus,
                    )
                })
                .collect()
        };

        Self {
            stop_id: stop_id.to_string(),
            stop_name: stop_name.to_string(),
            lines,
        }
    }

    fn line_top(index: usize) -> usize {
        HEADER_ROWS + index * (GLYPH_HEIGHT + LINE_GAP)
    }

    pub fn height(&self) -> usize {
        // Lines, then a spacer and the stop id.
        Self::line_top(self.lines.len()) + 1
    }

    pub fn width(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.matrix.width())
            .chain([
                self.stop_name.chars().count(),
                self.stop_id.chars().count(),
            ])
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Lay the board out for blink phase `tick`. Arriving lines go dark on
    /// odd ticks.
    pub fn resolve(&self, tick: u64, theme: &Theme) -> ResolvedScene {
        let mut ops = Vec::new();

        push_text(&mut ops, 0, &self.stop_name, &theme.header);

        for (index, line) in self.lines.iter().enumerate() {
            let top = Self::line_top(index);
            let dark = line.arriving && tick % 2 == 1;
            let lit_style = if line.night { &theme.night } else { &theme.lit };

            for (row, pixels) in line.matrix.rows().iter().enumerate() {
                for (col, &px) in pixels.iter().enumerate() {
                    let (ch, style) = if px != 0 && !dark {
                        (theme.lit_char, lit_style)
                    } else {
                        (theme.unlit_char, &theme.unlit)
                    };
                    ops.push(DrawOp {
                        x: col as u16,
                        y: (top + row) as u16,
                        ch,
                        style: style.clone(),
                        z_order: 0,
                    });
                }
            }
        }

        let footer = self.height() - 1;
        push_text(&mut ops, footer, &self.stop_id, &theme.unlit);

        ResolvedScene {
            width: self.width() as u16,
            height: self.height() as u16,
            ops,
        }
    }
}

fn push_text(ops: &mut Vec<DrawOp>, y: usize, text: &str, style: &Style) {
    for (x, ch) in text.chars().enumerate() {
        ops.push(DrawOp {
            x: x as u16,
            y: y as u16,
            ch,
            style: style.clone(),
            z_order: 1,
        });
    }
}
