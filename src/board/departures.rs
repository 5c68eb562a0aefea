//! Departure predictions from the `arrivals-and-departures-for-stop` API.
//!
//! `Payload` mirrors the parts of the JSON response the board reads. Every
//! section is optional on the wire; missing pieces deserialize as empty.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

const STOP_PREFIX: &str = "BKK_";

/// Departures further out than this many minutes are dropped by default.
pub const DEFAULT_MINUTES_AFTER: i64 = 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<PayloadData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadData {
    #[serde(default)]
    pub entry: Option<Entry>,
    #[serde(default)]
    pub references: References,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub stop_times: Option<Vec<StopTime>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTime {
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub stop_headsign: Option<String>,
    /// Scheduled departure, Unix seconds.
    #[serde(default)]
    pub departure_time: Option<i64>,
    /// Predicted departure, Unix seconds. Preferred over the schedule.
    #[serde(default)]
    pub predicted_departure_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct References {
    #[serde(default)]
    pub trips: HashMap<String, Trip>,
    #[serde(default)]
    pub routes: HashMap<String, Route>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub style: Option<RouteStyle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStyle {
    #[serde(default)]
    pub vehicle_icon: Option<VehicleIcon>,
    /// A number in practice, but kept loose so odd payloads still parse.
    #[serde(default)]
    pub group_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleIcon {
    #[serde(default)]
    pub name: Option<String>,
}

impl Route {
    fn is_night(&self) -> bool {
        let style = self.style.as_ref();
        self.color.as_deref() == Some("000000")
            || style
                .and_then(|s| s.vehicle_icon.as_ref())
                .and_then(|icon| icon.name.as_deref())
                == Some("night-bus")
            || style
                .and_then(|s| s.group_id.as_ref())
                .and_then(|g| g.as_i64())
                == Some(6)
    }
}

/// One upcoming departure as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Route short name, e.g. `7` or `M2`.
    pub route: String,
    pub headsign: String,
    pub minutes_until: i64,
    pub trip_id: Option<String>,
    pub vehicle_type: String,
    pub is_night_bus: bool,
}

impl Departure {
    /// `MOST` ("now") once due, otherwise `<n> perc`.
    pub fn display_time(&self) -> String {
        if self.minutes_until <= 0 {
            "MOST".to_string()
        } else {
            format!("{} perc", self.minutes_until)
        }
    }

    pub fn is_arriving(&self) -> bool {
        self.minutes_until <= 0
    }
}

/// Milliseconds since the Unix epoch, per the system clock.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Read and parse a payload file.
pub fn load_payload(path: impl AsRef<Path>) -> Result<Payload> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Extract departures due within `minutes_after` minutes of `now_ms`, soonest
/// first.
///
/// Returns `None` when the payload is not an `OK` response carrying stop
/// times; the caller keeps whatever it showed before.
pub fn extract_departures(
    payload: &Payload,
    now_ms: i64,
    minutes_after: i64,
) -> Option<Vec<Departure>> {
    if payload.status != "OK" {
        return None;
    }
    let data = payload.data.as_ref()?;
    let stop_times = data.entry.as_ref()?.stop_times.as_ref()?;
    let refs = &data.references;

    let mut departures: Vec<Departure> = stop_times
        .iter()
        .enumerate()
        .filter_map(|(index, stop_time)| {
            let departs_at = stop_time
                .predicted_departure_time
                .or(stop_time.departure_time)?;
            // Timestamps too far out to fit in milliseconds are dropped.
            let minutes_until = minutes_between(now_ms, departs_at.checked_mul(1000)?)?;

            let route_id = stop_time
                .trip_id
                .as_ref()
                .and_then(|id| refs.trips.get(id))
                .and_then(|trip| trip.route_id.as_deref());
            let route = route_id.and_then(|id| refs.routes.get(id));

            Some(Departure {
                route: route_short_name(
                    route,
                    route_id,
                    stop_time.trip_id.as_deref(),
                    index,
                ),
                headsign: stop_time
                    .stop_headsign
                    .clone()
                    .filter(|h| !h.is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                minutes_until,
                trip_id: stop_time.trip_id.clone(),
                vehicle_type: route
                    .and_then(|r| r.kind.clone())
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| "UNDEFINED".to_string()),
                is_night_bus: route.is_some_and(Route::is_night),
            })
        })
        .filter(|d| (0..=minutes_after).contains(&d.minutes_until))
        .collect();

    departures.sort_by_key(|d| d.minutes_until);
    Some(departures)
}

/// Whole minutes from `now_ms` to `then_ms`, rounding halves up.
fn minutes_between(now_ms: i64, then_ms: i64) -> Option<i64> {
    let delta = then_ms.checked_sub(now_ms)?;
    Some((delta as f64 / 60_000.0 + 0.5).floor() as i64)
}

fn route_short_name(
    route: Option<&Route>,
    route_id: Option<&str>,
    trip_id: Option<&str>,
    index: usize,
) -> String {
    if let Some(name) = route.and_then(|r| r.short_name.as_deref()).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if let Some(route_id) = route_id.filter(|id| !id.is_empty()) {
        let bare = route_id.replacen(STOP_PREFIX, "", 1);
        let trimmed = strip_leading_zeros(&bare);
        return if trimmed.is_empty() { bare } else { trimmed.to_string() };
    }
    if let Some(digits) = trip_id.and_then(first_digit_run) {
        return digits.to_string();
    }
    format!("Járat {}", index + 1)
}

/// Drop leading zeros that are followed by a digit: `0070` → `70`, `000` → `0`.
fn strip_leading_zeros(id: &str) -> &str {
    let zeros = id.len() - id.trim_start_matches('0').len();
    if zeros == 0 {
        return id;
    }
    match id[zeros..].chars().next() {
        Some(c) if c.is_ascii_digit() => &id[zeros..],
        // The last zero counts as the digit when a non-digit follows.
        _ if zeros > 1 => &id[zeros - 1..],
        _ => id,
    }
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Add the `BKK_` prefix unless it is already there.
pub fn full_stop_id(stop_id: &str) -> String {
    if stop_id.starts_with(STOP_PREFIX) {
        stop_id.to_string()
    } else {
        format!("{STOP_PREFIX}{stop_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW_MS: i64 = 1_700_000_000_000;
    const NOW_S: i64 = NOW_MS / 1000;

    fn payload(json: serde_json::Value) -> Payload {
        serde_json::from_value(json).unwrap()
    }

    fn sample() -> Payload {
        payload(serde_json::json!({
            "status": "OK",
            "data": {
                "entry": {
                    "stopTimes": [
                        { "tripId": "T1", "stopHeadsign": "Széll Kálmán tér",
                          "departureTime": NOW_S + 600, "predictedDepartureTime": NOW_S + 420 },
                        { "tripId": "T2", "stopHeadsign": "Örs vezér tere",
                          "departureTime": NOW_S + 60 },
                        { "tripId": "T3", "departureTime": NOW_S - 300 },
                        { "tripId": "T4", "departureTime": NOW_S + 3 * 3600 },
                        { "tripId": "T5" },
                        { "tripId": "T6", "stopHeadsign": "Kelenföld", "departureTime": NOW_S + 10 }
                    ]
                },
                "references": {
                    "trips": {
                        "T1": { "routeId": "BKK_0050" },
                        "T2": { "routeId": "BKK_9020" },
                        "T6": { "routeId": "BKK_0070" }
                    },
                    "routes": {
                        "BKK_0050": { "shortName": "5", "type": "BUS" },
                        "BKK_9020": { "shortName": "920", "type": "BUS", "color": "000000" },
                        "BKK_0070": { "type": "TRAM", "style": { "groupId": 6 } }
                    }
                }
            }
        }))
    }

    #[test]
    fn extracts_filters_and_sorts() {
        let deps = extract_departures(&sample(), NOW_MS, DEFAULT_MINUTES_AFTER).unwrap();
        let routes: Vec<_> = deps.iter().map(|d| d.route.as_str()).collect();
        assert_eq!(routes, ["70", "920", "5"]);
        assert_eq!(deps[0].minutes_until, 0);
        assert_eq!(deps[1].minutes_until, 1);
        // Prediction wins over the schedule.
        assert_eq!(deps[2].minutes_until, 7);
        assert_eq!(deps[2].headsign, "Széll Kálmán tér");
    }

    #[test]
    fn night_bus_and_vehicle_type() {
        let deps = extract_departures(&sample(), NOW_MS, DEFAULT_MINUTES_AFTER).unwrap();
        assert!(deps[0].is_night_bus, "groupId 6");
        assert!(deps[1].is_night_bus, "black colour");
        assert!(!deps[2].is_night_bus);
        assert_eq!(deps[0].vehicle_type, "TRAM");
    }

    #[test]
    fn non_ok_status_keeps_previous() {
        let p = payload(serde_json::json!({ "status": "NOT_FOUND" }));
        assert!(extract_departures(&p, NOW_MS, 60).is_none());
        let p = payload(serde_json::json!({ "status": "OK", "data": { "entry": {} } }));
        assert!(extract_departures(&p, NOW_MS, 60).is_none());
    }

    #[test]
    fn empty_stop_times_is_an_empty_board() {
        let p = payload(serde_json::json!({
            "status": "OK", "data": { "entry": { "stopTimes": [] } }
        }));
        assert_eq!(extract_departures(&p, NOW_MS, 60), Some(vec![]));
    }

    #[test]
    fn minutes_round_half_up() {
        assert_eq!(minutes_between(0, 29_999), Some(0));
        assert_eq!(minutes_between(0, 30_000), Some(1));
        assert_eq!(minutes_between(0, 89_999), Some(1));
        assert_eq!(minutes_between(0, -30_000), Some(0));
        assert_eq!(minutes_between(0, -30_001), Some(-1));
        assert_eq!(minutes_between(i64::MIN, i64::MAX), None);
    }

    #[test]
    fn out_of_range_timestamps_are_skipped() {
        let p = payload(serde_json::json!({
            "status": "OK",
            "data": { "entry": { "stopTimes": [
                { "tripId": "T1", "departureTime": 92_233_720_368_547_750_i64 },
                { "tripId": "T2", "predictedDepartureTime": i64::MIN },
                { "tripId": "T3", "departureTime": NOW_S + 120 }
            ] } }
        }));
        let deps = extract_departures(&p, NOW_MS, DEFAULT_MINUTES_AFTER).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].trip_id.as_deref(), Some("T3"));
        assert_eq!(deps[0].minutes_until, 2);
    }

    #[test]
    fn route_name_fallbacks() {
        let named = Route {
            short_name: Some("M2".into()),
            ..Default::default()
        };
        assert_eq!(route_short_name(Some(&named), Some("BKK_5200"), None, 0), "M2");
        assert_eq!(route_short_name(None, Some("BKK_0070"), None, 0), "70");
        assert_eq!(route_short_name(None, Some("BKK_0000"), None, 0), "0");
        assert_eq!(route_short_name(None, Some("BKK_H5"), None, 0), "H5");
        assert_eq!(route_short_name(None, Some("BKK_"), None, 0), "");
        assert_eq!(route_short_name(None, None, Some("B47129543"), 0), "47129543");
        assert_eq!(route_short_name(None, None, Some("TRIP"), 2), "Járat 3");
        assert_eq!(route_short_name(None, None, None, 0), "Járat 1");
    }

    #[test]
    fn leading_zero_stripping() {
        assert_eq!(strip_leading_zeros("0050"), "50");
        assert_eq!(strip_leading_zeros("50"), "50");
        assert_eq!(strip_leading_zeros("000"), "0");
        assert_eq!(strip_leading_zeros("0"), "0");
        assert_eq!(strip_leading_zeros("0A"), "0A");
        assert_eq!(strip_leading_zeros("00A"), "0A");
    }

    #[test]
    fn display_time() {
        let mut d = Departure {
            route: "7".into(),
            headsign: "Keleti".into(),
            minutes_until: 0,
            trip_id: None,
            vehicle_type: "BUS".into(),
            is_night_bus: false,
        };
        assert_eq!(d.display_time(), "MOST");
        assert!(d.is_arriving());
        d.minutes_until = 12;
        assert_eq!(d.display_time(), "12 perc");
    }

    #[test]
    fn stop_id_prefix() {
        assert_eq!(full_stop_id("F01234"), "BKK_F01234");
        assert_eq!(full_stop_id("BKK_F01234"), "BKK_F01234");
    }
}
