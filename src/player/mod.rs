//! Player: the live terminal board.
//!
//! Re-reads the departure payload on every refresh tick, rebuilds the board,
//! and drives only the changed cells to the terminal. Arriving lines blink
//! on the blink tick. The player does no layout of its own; it paints the
//! grids the renderer hands it.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{cursor, event, execute, queue, style, terminal};
use log::{debug, info, warn};

use crate::board::Board;
use crate::board::departures::{self, Departure};
use crate::board::layout;
use crate::config::BoardConfig;
use crate::renderer::Renderer;
use crate::types::{Color, Frame, Grid, NamedColor, Style};

/// Rows reserved above the canvas for the key hints.
const CANVAS_OFFSET: u16 = 1;

const HINTS: &[(&str, &str)] = &[("r", "refresh"), ("q/Esc", "quit")];

pub struct Player {
    stop_id: String,
    stop_name: String,
    payload_path: PathBuf,
    config: BoardConfig,
    departures: Vec<Departure>,
    last_refresh: String,
    tick: u64,
    grid: Option<Grid>,
}

impl Player {
    pub fn new(
        stop_id: String,
        stop_name: String,
        payload_path: PathBuf,
        config: BoardConfig,
    ) -> Self {
        Self {
            stop_id,
            stop_name,
            payload_path,
            config,
            departures: Vec::new(),
            last_refresh: String::new(),
            tick: 0,
            grid: None,
        }
    }

    /// Run the board in the terminal until the user quits.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.refetch();
        let mut timers = Timers::new(&self.config, Instant::now());
        self.render_hints(stdout)?;
        self.draw(stdout)?;

        loop {
            if event::poll(timers.until_blink(Instant::now()))? {
                match event::read()? {
                    event::Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                        use event::KeyCode::*;
                        match key.code {
                            Char('q') | Esc => break,
                            Char('r') => {
                                self.refetch();
                                timers.fetched(Instant::now());
                                self.draw(stdout)?;
                            }
                            _ => {}
                        }
                    }
                    event::Event::Resize(_, _) => {
                        self.grid = None;
                        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_hints(stdout)?;
                        self.draw(stdout)?;
                    }
                    _ => {}
                }
            }

            // Deadlines are checked after every event, not only on timeouts.
            let now = Instant::now();
            let mut redraw = false;
            if timers.blink_due(now) {
                self.tick = self.tick.wrapping_add(1);
                redraw = true;
            }
            if timers.refresh_due(now) {
                self.refetch();
                timers.fetched(now);
                redraw = true;
            }
            if redraw {
                self.draw(stdout)?;
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Departures
    // -----------------------------------------------------------------------

    /// Re-read the payload. An unreadable payload empties the board; a
    /// payload without data keeps the previous departures.
    fn refetch(&mut self) {
        match departures::load_payload(&self.payload_path) {
            Ok(payload) => {
                match departures::extract_departures(
                    &payload,
                    departures::now_ms(),
                    self.config.minutes_after,
                ) {
                    Some(deps) => {
                        debug!("{} departures for {}", deps.len(), self.stop_id);
                        self.departures = deps;
                        self.last_refresh = "updated".to_string();
                    }
                    None => {
                        info!(
                            "No departure data in {} (status {:?}), keeping previous",
                            self.payload_path.display(),
                            payload.status,
                        );
                        self.last_refresh = "no data".to_string();
                    }
                }
            }
            Err(e) => {
                warn!("{e:#}");
                self.departures.clear();
                self.last_refresh = "error".to_string();
            }
        }
    }

    fn direction_width(&self, columns: u16) -> usize {
        match self.config.screen_width {
            Some(px) => layout::direction_width_for_screen(px),
            None => layout::direction_width_for_columns(columns),
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn draw(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let (cols, rows) = terminal::size()?;
        let board = Board::build(
            &self.stop_id,
            &self.stop_name,
            &self.departures,
            self.direction_width(cols),
        );
        let grid = Renderer::rasterize(&board.resolve(self.tick, &self.config.theme));
        let frame = Renderer::frame(self.grid.as_ref(), &grid);

        paint(stdout, &frame, cols, rows)?;
        self.render_status(stdout, grid.len() as u16, rows)?;
        self.grid = Some(grid);
        Ok(())
    }

    fn render_hints(&self, stdout: &mut io::Stdout) -> Result<()> {
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, (key, label)) in HINTS.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            queue!(
                stdout,
                style::SetAttribute(style::Attribute::Bold),
                style::Print(format!("[{key}]")),
                style::SetAttribute(style::Attribute::Reset),
                style::SetAttribute(style::Attribute::Dim),
                style::Print(format!(" {label}")),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout, canvas_height: u16, term_h: u16) -> Result<()> {
        let status_y = canvas_height + CANVAS_OFFSET;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let next = self
            .departures
            .first()
            .map(|d| format!("{} {}", d.route, d.display_time()))
            .unwrap_or_else(|| "-".to_string());
        let status = format!(
            " {} departures | next: {} | {} ",
            self.departures.len(),
            next,
            self.last_refresh,
        );

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Blink and refresh deadlines for the event loop.
struct Timers {
    blink: Duration,
    refresh: Duration,
    blinked_at: Instant,
    fetched_at: Instant,
}

impl Timers {
    fn new(config: &BoardConfig, now: Instant) -> Self {
        Self {
            blink: Duration::from_millis(config.blink_millis.max(50)),
            refresh: Duration::from_secs(config.refresh_secs.max(1)),
            blinked_at: now,
            fetched_at: now,
        }
    }

    /// How long to wait for input before the next blink is due.
    fn until_blink(&self, now: Instant) -> Duration {
        self.blink
            .saturating_sub(now.saturating_duration_since(self.blinked_at))
    }

    /// Whether a blink tick is due; starts the next period when it is.
    fn blink_due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.blinked_at) < self.blink {
            return false;
        }
        self.blinked_at = now;
        true
    }

    fn refresh_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) >= self.refresh
    }

    fn fetched(&mut self, now: Instant) {
        self.fetched_at = now;
    }
}

/// Drive a frame to the terminal, clipped to `cols x rows`.
fn paint(stdout: &mut io::Stdout, frame: &Frame, cols: u16, rows: u16) -> Result<()> {
    match frame {
        Frame::Full { cells } => {
            queue!(
                stdout,
                cursor::MoveTo(0, CANVAS_OFFSET),
                terminal::Clear(terminal::ClearType::FromCursorDown),
            )?;
            for (y, row) in cells.iter().enumerate() {
                let y = y as u16 + CANVAS_OFFSET;
                if y >= rows {
                    break;
                }
                queue!(stdout, cursor::MoveTo(0, y))?;
                for cell in row.iter().take(cols as usize) {
                    let cs = to_content_style(&cell.style);
                    queue!(
                        stdout,
                        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                    )?;
                }
            }
        }
        Frame::Diff { changes } => {
            for change in changes {
                let y = change.y + CANVAS_OFFSET;
                if change.x >= cols || y >= rows {
                    continue;
                }
                let cs = to_content_style(&change.cell.style);
                queue!(
                    stdout,
                    cursor::MoveTo(change.x, y),
                    style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
                )?;
            }
        }
    }
    stdout.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
