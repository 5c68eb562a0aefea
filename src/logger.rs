//! stderr backend for the `log` facade.
//!
//! Lines look like `[WARN dotboard::player] message`. The level comes from
//! `DOTBOARD_LOG` when set, otherwise from the board config. A level that
//! does not parse means `warn`.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

const ENV_VAR: &str = "DOTBOARD_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", format_record(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_record(record: &Record) -> String {
    format!("[{} {}] {}", record.level(), record.target(), record.args())
}

/// The level requested through the environment, if the variable is set.
fn env_level() -> Option<LevelFilter> {
    std::env::var(ENV_VAR).ok().map(|value| parse_level(&value))
}

fn parse_level(value: &str) -> LevelFilter {
    value.trim().parse().unwrap_or(LevelFilter::Warn)
}

/// Install the logger at `fallback`, or the environment's level when set.
/// Installing twice keeps the first logger.
pub fn init(fallback: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(env_level().unwrap_or(fallback));
    }
}

/// Adopt `level` from config unless the environment already chose one.
pub fn apply_config_level(level: LevelFilter) {
    if env_level().is_none() {
        log::set_max_level(level);
    }
}
