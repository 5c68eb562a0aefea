use std::{path::PathBuf, process};

use anyhow::{Context, Result, bail};
use log::{LevelFilter, info, warn};

use dotboard::{
    board::{
        Board,
        departures::{self, full_stop_id},
        layout,
        stops::StopDirectory,
    },
    config::BoardConfig,
    engine::Engine,
    logger,
    player::Player,
    renderer::Renderer,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const RENDER_USAGE: &str = "dotboard render <text> [--json]";
const BOARD_USAGE: &str = "dotboard board <stop-id> <payload.json> [--stops stops.txt] [--width px]";
const WATCH_USAGE: &str = "dotboard watch <stop-id> <payload.json> [--stops stops.txt]";
const SEARCH_USAGE: &str = "dotboard search <stops.txt> <query> [--limit n]";

/// Terminal width assumed when stdout is not a terminal.
const FALLBACK_COLUMNS: u16 = 120;

fn run() -> Result<()> {
    logger::init(LevelFilter::Warn);
    let config = BoardConfig::load();
    logger::apply_config_level(config.level_filter());

    let mut args = std::env::args().skip(1);
    let command = args.next();
    let opts = Options::parse(args)?;

    match command.as_deref() {
        Some("render") => {
            if opts.positional.is_empty() {
                bail!("Usage: {RENDER_USAGE}");
            }
            render(&opts.positional.join(" "), opts.has_flag("--json"))
        }
        Some("board") => {
            let stop_id = opts.arg(0).context(BOARD_USAGE)?;
            let payload = opts.arg(1).context(BOARD_USAGE)?;
            let width = opts
                .value("--width")
                .map(|w| w.parse::<u32>().with_context(|| format!("Invalid --width {w}")))
                .transpose()?;
            board(&config, stop_id, payload, opts.value("--stops"), width)
        }
        Some("watch") => {
            let stop_id = opts.arg(0).context(WATCH_USAGE)?;
            let payload = opts.arg(1).context(WATCH_USAGE)?;
            watch(config, stop_id, payload, opts.value("--stops"))
        }
        Some("search") => {
            let path = opts.arg(0).context(SEARCH_USAGE)?;
            if opts.positional.len() < 2 {
                bail!("Usage: {SEARCH_USAGE}");
            }
            let query = opts.positional[1..].join(" ");
            let limit = match opts.value("--limit") {
                Some(n) => n.parse().with_context(|| format!("Invalid --limit {n}"))?,
                None => 20,
            };
            search(path, &query, limit)
        }
        _ => bail!(
            "dotboard: dot-matrix departure board\n\nUsage:\n  {RENDER_USAGE}\n  {BOARD_USAGE}\n  {WATCH_USAGE}\n  {SEARCH_USAGE}"
        ),
    }
}

fn render(text: &str, json: bool) -> Result<()> {
    let matrix = Engine::compose(text);
    if json {
        println!("{}", serde_json::to_string(&matrix)?);
    } else {
        print!("{matrix}");
    }
    Ok(())
}

fn board(
    config: &BoardConfig,
    stop_id: &str,
    payload_path: &str,
    stops_path: Option<&str>,
    screen_width: Option<u32>,
) -> Result<()> {
    let stop_id = full_stop_id(stop_id);
    let stop_name = stop_name(stops_path, &stop_id);

    let payload = departures::load_payload(payload_path)?;
    let deps = departures::extract_departures(&payload, departures::now_ms(), config.minutes_after)
        .unwrap_or_else(|| {
            warn!("No departure data in {payload_path} (status {:?})", payload.status);
            Vec::new()
        });

    let direction_width = match screen_width.or(config.screen_width) {
        Some(px) => layout::direction_width_for_screen(px),
        None => {
            let columns = crossterm::terminal::size()
                .map(|(cols, _)| cols)
                .unwrap_or(FALLBACK_COLUMNS);
            layout::direction_width_for_columns(columns)
        }
    };

    let board = Board::build(&stop_id, &stop_name, &deps, direction_width);
    let grid = Renderer::rasterize(&board.resolve(0, &config.theme));
    print!("{}", Renderer::to_plain(&grid));
    Ok(())
}

fn watch(config: BoardConfig, stop_id: &str, payload_path: &str, stops_path: Option<&str>) -> Result<()> {
    let stop_id = full_stop_id(stop_id);
    let stop_name = stop_name(stops_path, &stop_id);
    info!("Watching {payload_path} for {stop_id}");

    let mut player = Player::new(stop_id, stop_name, PathBuf::from(payload_path), config);
    player.play()
}

fn search(path: &str, query: &str, limit: usize) -> Result<()> {
    let directory = StopDirectory::open(path)?;
    for stop in directory.search(query, limit) {
        match stop.position {
            Some((lat, lon)) => println!("{}\t{}\t{lat:.6},{lon:.6}", stop.id, stop.name),
            None => println!("{}\t{}", stop.id, stop.name),
        }
    }
    Ok(())
}

/// The stop's display name: from the stop directory when one is given,
/// otherwise the bare id.
fn stop_name(stops_path: Option<&str>, stop_id: &str) -> String {
    match stops_path {
        Some(path) => match StopDirectory::open(path) {
            Ok(directory) => {
                info!("Loaded {} stops from {path}", directory.len());
                directory.name(stop_id)
            }
            Err(e) => {
                warn!("{e:#}");
                StopDirectory::default().name(stop_id)
            }
        },
        None => stop_id.replacen("BKK_", "", 1),
    }
}

/// Command-line arguments after the subcommand: positionals, `--name value`
/// options and bare flags.
#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    values: Vec<(String, String)>,
    flags: Vec<String>,
}

const BARE_FLAGS: &[&str] = &["--json"];

impl Options {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut opts = Options::default();
        let mut args = args;
        while let Some(arg) = args.next() {
            if BARE_FLAGS.contains(&arg.as_str()) {
                opts.flags.push(arg);
            } else if arg.starts_with("--") {
                let value = args
                    .next()
                    .with_context(|| format!("{arg} needs a value"))?;
                opts.values.push((arg, value));
            } else {
                opts.positional.push(arg);
            }
        }
        Ok(opts)
    }

    fn arg(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|f| f == name)
    }
}
