//! Stop directory backed by a GTFS `stops.txt`.
//!
//! Loaded once and passed by reference to whatever needs stop names.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::StringRecord;
use log::debug;

use crate::engine::normalize;

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: String,
    pub name: String,
    /// Latitude and longitude, when the file has both.
    pub position: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct StopDirectory {
    stops: BTreeMap<String, Stop>,
}

/// Column positions from the header row. Feeds often omit trailing fields,
/// so a column may be missing from any given row.
struct Columns {
    id: usize,
    name: Option<usize>,
    lat: Option<usize>,
    lon: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Ok(Self {
            id: find("stop_id").context("No stop_id column")?,
            name: find("stop_name"),
            lat: find("stop_lat"),
            lon: find("stop_lon"),
        })
    }
}

/// A non-empty field, or `None` when the row is too short to have it.
fn field(row: &StringRecord, column: Option<usize>) -> Option<&str> {
    column.and_then(|i| row.get(i)).filter(|s| !s.is_empty())
}

fn coordinate(row: &StringRecord, column: Option<usize>) -> Option<f64> {
    field(row, column)?.parse().ok()
}

impl StopDirectory {
    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let mut stops = BTreeMap::new();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns = Columns::from_headers(reader.headers()?)?;
        for row in reader.records() {
            let row = row?;
            let Some(id) = field(&row, Some(columns.id)) else {
                continue;
            };
            let Some(name) = field(&row, columns.name) else {
                continue;
            };
            if stops.contains_key(id) {
                debug!("Duplicate stop {id}, keeping the first");
                continue;
            }
            let position = coordinate(&row, columns.lat).zip(coordinate(&row, columns.lon));
            stops.insert(
                id.to_string(),
                Stop {
                    id: id.to_string(),
                    name: name.to_string(),
                    position,
                },
            );
        }
        Ok(Self { stops })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::load(file).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.get(&bare_stop_id(stop_id))
    }

    /// Display name for an API stop id such as `BKK_F01234`, falling back to
    /// `Megálló <id>` for unknown stops.
    pub fn name(&self, stop_id: &str) -> String {
        match self.get(stop_id) {
            Some(stop) => stop.name.clone(),
            None => format!("Megálló {stop_id}"),
        }
    }

    /// Stops whose name contains `query`, ignoring case and accents, plus an
    /// exact id match. At most `limit` results, in id order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Stop> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let needle = search_key(query);
        let exact = bare_stop_id(query);
        self.stops
            .values()
            .filter(|stop| stop.id == exact || search_key(&stop.name).contains(&needle))
            .take(limit)
            .collect()
    }
}

/// Uppercased with the Hungarian accents dropped: `Deák tér` → `DEAK TER`.
fn search_key(text: &str) -> String {
    normalize(text)
        .chars()
        .map(|ch| match ch {
            'Á' => 'A',
            'É' => 'E',
            'Í' => 'I',
            'Ó' | 'Ö' | 'Ő' => 'O',
            'Ú' | 'Ü' | 'Ű' => 'U',
            _ => ch,
        })
        .collect()
}

/// `BKK_F01234` → `F01234`, `BKK_D123` → `123`: the first `BKK_` goes, then
/// one leading `D`.
fn bare_stop_id(stop_id: &str) -> String {
    let without_prefix = stop_id.replacen("BKK_", "", 1);
    match without_prefix.strip_prefix('D') {
        Some(rest) => rest.to_string(),
        None => without_prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = "\
stop_id,stop_name,stop_lat,stop_lon,location_type
F01234,\"Széll Kálmán tér M\",47.507,19.023,0
F00001,Deák Ferenc tér,47.497,19.054,
F00002,,47.0,19.0,0
F01234,Duplicate,0,0,0
123,\"Örs vezér tere, Kerepesi út\",47.502,19.137,0
F00003,Kelenföld vasútállomás
";

    fn directory() -> StopDirectory {
        StopDirectory::load(STOPS.as_bytes()).unwrap()
    }

    #[test]
    fn loads_named_stops_once() {
        let dir = directory();
        assert_eq!(dir.len(), 4);
        assert_eq!(dir.get("F01234").unwrap().name, "Széll Kálmán tér M");
        assert_eq!(dir.get("F01234").unwrap().position, Some((47.507, 19.023)));
        assert_eq!(dir.get("F00003").unwrap().position, None);
        assert!(dir.get("F00002").is_none());
    }

    #[test]
    fn quoted_commas() {
        assert_eq!(directory().name("123"), "Örs vezér tere, Kerepesi út");
    }

    #[test]
    fn name_strips_api_prefixes() {
        let dir = directory();
        assert_eq!(dir.name("BKK_F00001"), "Deák Ferenc tér");
        assert_eq!(dir.name("BKK_D123"), "Örs vezér tere, Kerepesi út");
        assert_eq!(dir.name("BKK_F99999"), "Megálló BKK_F99999");
    }

    #[test]
    fn search_ignores_case() {
        let dir = directory();
        let hits: Vec<_> = dir.search("széll", 10).into_iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, ["F01234"]);
        let hits: Vec<_> = dir.search("TÉR", 10).into_iter().map(|s| s.id.as_str()).collect();
        // "tere" matches too once accents are folded.
        assert_eq!(hits, ["123", "F00001", "F01234"]);
        assert_eq!(dir.search("tér", 1).len(), 1);
        assert!(dir.search("  ", 10).is_empty());
    }

    #[test]
    fn search_ignores_accents() {
        let dir = directory();
        let hits: Vec<_> = dir.search("deak", 10).into_iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, ["F00001"]);
        let hits: Vec<_> = dir.search("szell kalman", 10).into_iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, ["F01234"]);
        let hits: Vec<_> = dir.search("kelenfold", 10).into_iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, ["F00003"]);
        assert_eq!(search_key("Őrház Ügyelet"), "ORHAZ UGYELET");
    }

    #[test]
    fn short_rows_leave_missing_columns_empty() {
        let csv = "stop_id,stop_name,stop_lat,stop_lon\nF1,Keleti\nF2\nF3,Nyugati,47.5\n";
        let dir = StopDirectory::load(csv.as_bytes()).unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get("F1").unwrap().position, None);
        assert_eq!(dir.get("F3").unwrap().position, None);
        assert!(dir.get("F2").is_none());
    }

    #[test]
    fn columns_follow_the_header() {
        let csv = "stop_lat,stop_name,stop_id\n47.1,Astoria,F9\n";
        let dir = StopDirectory::load(csv.as_bytes()).unwrap();
        assert_eq!(dir.name("BKK_F9"), "Astoria");
    }

    #[test]
    fn missing_id_column_is_an_error() {
        assert!(StopDirectory::load("name\nKeleti\n".as_bytes()).is_err());
    }

    #[test]
    fn search_matches_ids() {
        let dir = directory();
        let hits: Vec<_> = dir.search("F00003", 10).into_iter().map(|s| s.name.as_str()).collect();
        assert_eq!(hits, ["Kelenföld vasútállomás"]);
    }

    #[test]
    fn empty_directory() {
        let dir = StopDirectory::default();
        assert!(dir.is_empty());
        assert_eq!(dir.name("BKK_F1"), "Megálló BKK_F1");
    }
}
