//! Dot-matrix departure board.
//!
//! `engine` turns text into 5x7 dot-matrix pixels; `board` turns live stop
//! departures into lines of that text; `renderer` and `player` put the
//! result on a terminal.

pub mod board;
pub mod config;
pub mod engine;
pub mod logger;
pub mod player;
pub mod renderer;
pub mod types;
