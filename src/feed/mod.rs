//! Traffic feed: wire format and the sources that produce it
//!
//! A source returns its retained event history on every call, oldest first.
//! Each event carries its index in the source's append-only log (for the HTTP
//! feed, its position in the list); the ingestion cursor relies on it for
//! deduplication.

pub mod demo;
pub mod http;
pub mod poller;

use crate::activity::{ActivitySample, TopTalker};
use crate::error::FeedError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::io::Read;

/// One reported connection
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficEvent {
    pub index: usize,
    pub lat: f32,
    pub lon: f32,
    pub suspicious: bool,
    pub ip: Option<String>,
    pub country: Option<String>,
    /// Source-side unix seconds
    pub timestamp: Option<i64>,
}

/// Everything a single poll returns
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedSnapshot {
    pub events: Vec<TrafficEvent>,
    pub activity: Vec<ActivitySample>,
    pub top_talkers: Vec<TopTalker>,
}

/// Pull endpoint for traffic snapshots
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> Result<FeedSnapshot, FeedError>;

    /// Human-readable origin for the status line
    fn describe(&self) -> String;
}

#[derive(Deserialize)]
struct WireDocument {
    points: Vec<WirePoint>,
    #[serde(default)]
    activity: Vec<ActivitySample>,
    #[serde(default)]
    top_countries: Vec<TopTalker>,
}

#[derive(Deserialize)]
struct WirePoint {
    lat: f32,
    lon: f32,
    #[serde(default, deserialize_with = "suspicious_flag")]
    suspicious: bool,
    ip: Option<String>,
    country: Option<String>,
    #[serde(default, deserialize_with = "loose_timestamp")]
    timestamp: Option<i64>,
}

/// Sources send 0/1, sometimes as floats, sometimes as booleans
fn suspicious_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid suspicious flag: {other}"
        ))),
    }
}

/// Passed through from the sender untouched, so accept numbers or numeric strings
fn loose_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|v| v as i64),
        _ => None,
    })
}

impl From<WireDocument> for FeedSnapshot {
    fn from(doc: WireDocument) -> Self {
        let events = doc
            .points
            .into_iter()
            .enumerate()
            .map(|(index, p)| TrafficEvent {
                index,
                lat: p.lat,
                lon: p.lon,
                suspicious: p.suspicious,
                ip: p.ip,
                country: p.country,
                timestamp: p.timestamp,
            })
            .collect();

        Self {
            events,
            activity: doc.activity,
            top_talkers: doc.top_countries,
        }
    }
}

impl FeedSnapshot {
    pub fn from_reader(reader: impl Read) -> Result<Self, FeedError> {
        let doc: WireDocument = serde_json::from_reader(reader)?;
        Ok(doc.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<FeedSnapshot, FeedError> {
        FeedSnapshot::from_reader(body.as_bytes())
    }

    const DOCUMENT: &str = r#"{
        "points": [
            {"lat": 10.0, "lon": 20.0, "suspicious": 0, "timestamp": 1700000000, "ip": "1.2.3.4", "country": "DE"},
            {"lat": -5.0, "lon": 30.0, "suspicious": 1, "timestamp": 1700000001, "ip": "5.6.7.8", "country": null}
        ],
        "top_countries": [{"country": "DE", "count": 1}],
        "activity": [{"timestamp": 1700000000, "count": 1}, {"timestamp": 1700000001, "count": 1}]
    }"#;

    #[test]
    fn decodes_server_document() {
        let snap = parse(DOCUMENT).unwrap();
        assert_eq!(snap.events.len(), 2);
        assert_eq!(snap.events[0].index, 0);
        assert_eq!(snap.events[1].index, 1);
        assert!(!snap.events[0].suspicious);
        assert!(snap.events[1].suspicious);
        assert_eq!(snap.events[0].country.as_deref(), Some("DE"));
        assert_eq!(snap.events[1].country, None);
        assert_eq!(snap.activity.len(), 2);
        assert_eq!(snap.top_talkers[0].count, 1);
    }

    #[test]
    fn suspicious_accepts_float_and_bool() {
        let body = r#"{"points": [
            {"lat": 0, "lon": 0, "suspicious": 1.0},
            {"lat": 0, "lon": 0, "suspicious": 0.0},
            {"lat": 0, "lon": 0, "suspicious": true},
            {"lat": 0, "lon": 0}
        ]}"#;
        let flags: Vec<_> = parse(body)
            .unwrap()
            .events
            .iter()
            .map(|e| e.suspicious)
            .collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }

    #[test]
    fn sender_timestamps_are_passed_through_loosely() {
        let body = r#"{"points": [
            {"lat": 0, "lon": 0, "timestamp": 1700000000},
            {"lat": 0, "lon": 0, "timestamp": "1700000001.5"},
            {"lat": 0, "lon": 0, "timestamp": "yesterday"},
            {"lat": 0, "lon": 0}
        ]}"#;
        let stamps: Vec<_> = parse(body)
            .unwrap()
            .events
            .iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(stamps, vec![Some(1_700_000_000), Some(1_700_000_001), None, None]);
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let snap = parse(r#"{"points": []}"#).unwrap();
        assert!(snap.events.is_empty());
        assert!(snap.activity.is_empty());
        assert!(snap.top_talkers.is_empty());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        for body in ["not json", r#"{"activity": []}"#, r#"{"points": [{"lat": "x", "lon": 0}]}"#] {
            let err = parse(body).unwrap_err();
            assert_eq!(err.kind(), "decode", "{body}");
        }
    }
}
