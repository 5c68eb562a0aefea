use std::path::PathBuf;

use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};

use crate::board::departures::DEFAULT_MINUTES_AFTER;
use crate::types::{Color, NamedColor, Style};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Seconds between payload refetches.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Half-period of the arriving-line blink.
    #[serde(default = "default_blink_millis")]
    pub blink_millis: u64,
    #[serde(default = "default_minutes_after")]
    pub minutes_after: i64,
    /// Viewport width in pixels. Overrides fitting the direction column to
    /// the terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_width: Option<u32>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_lit_char")]
    pub lit_char: char,
    #[serde(default = "default_unlit_char")]
    pub unlit_char: char,
    #[serde(default = "default_lit")]
    pub lit: Style,
    #[serde(default = "default_night")]
    pub night: Style,
    #[serde(default = "default_unlit")]
    pub unlit: Style,
    #[serde(default = "default_header")]
    pub header: Style,
}

fn default_refresh_secs() -> u64 { 5 }
fn default_blink_millis() -> u64 { 500 }
fn default_minutes_after() -> i64 { DEFAULT_MINUTES_AFTER }
fn default_log_level() -> String { "warn".into() }
fn default_lit_char() -> char { '●' }
fn default_unlit_char() -> char { '·' }

fn default_lit() -> Style {
    Style {
        fg: Some(Color::Rgb { r: 255, g: 176, b: 0 }),
        bold: true,
        ..Default::default()
    }
}

fn default_night() -> Style {
    Style {
        fg: Some(Color::Named(NamedColor::Cyan)),
        bold: true,
        ..Default::default()
    }
}

fn default_unlit() -> Style {
    Style {
        fg: Some(Color::Rgb { r: 60, g: 40, b: 0 }),
        dim: true,
        ..Default::default()
    }
}

fn default_header() -> Style {
    Style {
        fg: Some(Color::Named(NamedColor::White)),
        bold: true,
        ..Default::default()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            lit_char: default_lit_char(),
            unlit_char: default_unlit_char(),
            lit: default_lit(),
            night: default_night(),
            unlit: default_unlit(),
            header: default_header(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            refresh_secs: default_refresh_secs(),
            blink_millis: default_blink_millis(),
            minutes_after: default_minutes_after(),
            screen_width: None,
            log_level: default_log_level(),
            theme: Theme::default(),
        }
    }
}

impl BoardConfig {
    /// Load from `$DOTBOARD_CONFIG` or `~/.config/dotboard/board.json`.
    /// A missing file means defaults; an invalid one is reported and ignored.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::parse(&json).unwrap_or_else(|e| {
                warn!(
                    "Invalid board config {} ({e}), using defaults",
                    config_path.display()
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The configured log level; `warn` when it does not parse.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Warn)
    }

    fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("DOTBOARD_CONFIG") {
            return PathBuf::from(path);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("dotboard");
        path.push("board.json");
        path
    }
}
