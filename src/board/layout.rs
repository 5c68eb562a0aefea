//! Fixed-width departure lines.
//!
//! A line reads `ROUTE DIRECTION TIME`: the route padded to 4 characters,
//! the direction truncated and padded to a budgeted width, and the minutes
//! right-aligned in 3. Every line of a board therefore composes to the same
//! pixel width.

use crate::types::GLYPH_WIDTH;

use super::departures::Departure;

pub const ROUTE_COLUMN: usize = 4;
pub const TIME_COLUMN: usize = 3;

/// Most lines a board shows.
pub const MAX_LINES: usize = 6;

/// Shown in place of departures when there are none ("no service").
pub const EMPTY_BOARD: &str = "NINCS JARAT";

pub const MIN_DIRECTION: usize = 6;
pub const MAX_DIRECTION: usize = 20;

/// Direction width for a browser-style viewport `screen_width` pixels wide,
/// with each character taking 3.8px including its gap.
pub fn direction_width_for_screen(screen_width: u32) -> usize {
    const PADDING: f64 = 70.0;
    const CHAR_WIDTH: f64 = 3.8;

    let route_width = (ROUTE_COLUMN + 1) as f64 * CHAR_WIDTH;
    let time_width = (TIME_COLUMN + 1) as f64 * CHAR_WIDTH;
    let available = screen_width as f64 - PADDING - route_width - time_width;
    let fits = (available / CHAR_WIDTH).floor() as i64;

    let cap = match screen_width {
        0..=390 => 9,
        391..=428 => 10,
        429..=440 => 12,
        _ => 16,
    };
    fits.min(cap).clamp(MIN_DIRECTION as i64, MAX_DIRECTION as i64) as usize
}

/// Direction width for a terminal `columns` cells wide, one cell per pixel:
/// the widest direction whose line still fits.
pub fn direction_width_for_columns(columns: u16) -> usize {
    (MIN_DIRECTION..=MAX_DIRECTION)
        .rev()
        .find(|&width| line_width(width) <= columns as usize)
        .unwrap_or(MIN_DIRECTION)
}

/// Format one departure as a fixed-width line.
pub fn format_line(departure: &Departure, direction_width: usize) -> String {
    let time = if departure.minutes_until <= 0 {
        "0'".to_string()
    } else {
        format!("{}'", departure.minutes_until)
    };
    let direction: String = departure.headsign.chars().take(direction_width).collect();
    format!(
        "{:<route$} {:<dir$} {:>time_w$}",
        departure.route,
        direction,
        time,
        route = ROUTE_COLUMN,
        dir = direction_width,
        time_w = TIME_COLUMN,
    )
}

/// Pixel width of a line formatted with `direction_width` and a route of at
/// most `ROUTE_COLUMN` characters.
pub fn line_width(direction_width: usize) -> usize {
    let chars = ROUTE_COLUMN + 1 + direction_width + 1 + TIME_COLUMN;
    // One blank column between characters.
    chars * GLYPH_WIDTH + (chars - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::text_width;

    fn departure(route: &str, headsign: &str, minutes_until: i64) -> Departure {
        Departure {
            route: route.to_string(),
            headsign: headsign.to_string(),
            minutes_until,
            trip_id: None,
            vehicle_type: "BUS".to_string(),
            is_night_bus: false,
        }
    }

    #[test]
    fn pads_and_truncates() {
        let d = departure("7", "Széll Kálmán tér", 5);
        assert_eq!(format_line(&d, 10), "7    Széll Kálm  5'");
        let d = departure("M2", "Örs", 12);
        assert_eq!(format_line(&d, 6), "M2   Örs    12'");
    }

    #[test]
    fn long_route_is_not_truncated() {
        let d = departure("907A", "Kelenföld", 45);
        assert_eq!(format_line(&d, 6), "907A Kelenf 45'");
        let d = departure("Járat 1", "N/A", 3);
        assert_eq!(format_line(&d, 6), "Járat 1 N/A     3'");
    }

    #[test]
    fn due_departures_read_zero() {
        let d = departure("4", "Keleti", 0);
        assert!(format_line(&d, 6).ends_with(" 0'"));
    }

    #[test]
    fn lines_share_a_width() {
        let a = format_line(&departure("1", "A", 1), 12);
        let b = format_line(&departure("1234", "ABCDEFGHIJKLMNOP", 59), 12);
        assert_eq!(a.chars().count(), b.chars().count());
        assert_eq!(text_width(&a), line_width(12));
    }

    #[test]
    fn screen_budget() {
        assert_eq!(direction_width_for_screen(100), 6);
        assert_eq!(direction_width_for_screen(320), 9);
        assert_eq!(direction_width_for_screen(375), 9);
        assert_eq!(direction_width_for_screen(414), 10);
        assert_eq!(direction_width_for_screen(440), 12);
        assert_eq!(direction_width_for_screen(1920), 16);
        assert_eq!(direction_width_for_screen(0), 6);
    }

    #[test]
    fn column_budget_fits() {
        for cols in [40u16, 80, 100, 120, 200] {
            let w = direction_width_for_columns(cols);
            assert!((MIN_DIRECTION..=MAX_DIRECTION).contains(&w));
            if w > MIN_DIRECTION {
                assert!(line_width(w) <= cols as usize, "{cols} cols");
            }
            if w < MAX_DIRECTION {
                assert!(line_width(w + 1) > cols as usize, "{cols} cols");
            }
        }
        assert_eq!(direction_width_for_columns(80), 6);
        assert_eq!(direction_width_for_columns(119), 11);
        assert_eq!(direction_width_for_columns(400), 20);
    }
}
