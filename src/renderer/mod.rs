//! Renderer: the deterministic rasterizer.
//!
//! Takes `ResolvedScene`s (in-memory, from the board) and produces cell
//! `Grid`s plus the `Frame`s that move a screen from one grid to the next.
//!
//! The renderer is pure and stateless. Given the same input, it always
//! produces the same output. It knows nothing about departures, time or
//! terminals.

use crate::types::{Cell, CellChange, Frame, Grid, ResolvedScene};

pub struct Renderer;

impl Renderer {
    /// Rasterize a resolved scene onto a `width x height` cell grid.
    ///
    /// Draw operations are sorted by z-order so that higher z values
    /// paint over lower ones. Ops outside the grid are clipped.
    pub fn rasterize(scene: &ResolvedScene) -> Grid {
        let w = scene.width as usize;
        let h = scene.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        let mut ops: Vec<_> = scene.ops.iter().collect();
        ops.sort_by_key(|op| op.z_order);

        for op in ops {
            let x = op.x as usize;
            let y = op.y as usize;
            if x < w && y < h {
                grid[y][x] = Cell {
                    ch: op.ch,
                    style: op.style.clone(),
                };
            }
        }

        grid
    }

    /// The frame that turns `prev` into `next`: a full frame when there is
    /// nothing to diff against or the size changed, a cell diff otherwise.
    pub fn frame(prev: Option<&Grid>, next: &Grid) -> Frame {
        match prev {
            Some(prev) if same_shape(prev, next) => Frame::Diff {
                changes: Self::diff(prev, next),
            },
            _ => Frame::Full {
                cells: next.clone(),
            },
        }
    }

    /// The grid as plain text, one line per row, trailing blanks trimmed.
    pub fn to_plain(grid: &Grid) -> String {
        let mut out = String::new();
        for row in grid {
            let line: String = row.iter().map(|cell| cell.ch).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    /// Compute a cell-level diff between two grids.
    fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}

fn same_shape(a: &Grid, b: &Grid) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(ra, rb)| ra.len() == rb.len())
}
