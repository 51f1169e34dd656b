//! Synthetic traffic so the globe runs without a server

use super::{FeedSnapshot, FeedSource, TrafficEvent};
use crate::activity::{ActivitySample, TopTalker};
use crate::error::FeedError;
use rand::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Seconds of per-second activity reported in each snapshot
const ACTIVITY_WINDOW_SECS: i64 = 60;
const TOP_N_COUNTRIES: usize = 10;
/// Events kept in the log; real servers cap theirs the same way
const DEMO_HISTORY_CAP: usize = 5000;

// (lat, lon, country)
const DEMO_CITIES: &[(f32, f32, &str)] = &[
    (40.7, -74.0, "US"),
    (37.8, -122.4, "US"),
    (41.9, -87.6, "US"),
    (-23.5, -46.6, "BR"),
    (19.4, -99.1, "MX"),
    (43.7, -79.4, "CA"),
    (51.5, -0.1, "GB"),
    (48.9, 2.4, "FR"),
    (52.5, 13.4, "DE"),
    (50.1, 8.7, "DE"),
    (55.8, 37.6, "RU"),
    (59.3, 18.1, "SE"),
    (35.7, 139.7, "JP"),
    (31.2, 121.5, "CN"),
    (39.9, 116.4, "CN"),
    (1.4, 103.8, "SG"),
    (37.6, 127.0, "KR"),
    (28.6, 77.2, "IN"),
    (-6.2, 106.8, "ID"),
    (25.3, 55.3, "AE"),
    (-33.9, 151.2, "AU"),
    (-33.9, 18.4, "ZA"),
    (6.5, 3.4, "NG"),
];

struct DemoState {
    rng: StdRng,
    events: VecDeque<TrafficEvent>,
    next_index: usize,
    request_times: VecDeque<i64>,
    country_counts: HashMap<&'static str, u64>,
}

/// Fake append-only event log with realistic-looking clustering.
///
/// Indices are absolute, so once the cap is reached the oldest events drop off
/// the front while new ones keep getting fresh indices.
pub struct DemoFeed {
    state: Mutex<DemoState>,
    suspicious_ratio: f64,
    history_cap: usize,
}

impl DemoFeed {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            state: Mutex::new(DemoState {
                rng,
                events: VecDeque::new(),
                next_index: 0,
                request_times: VecDeque::new(),
                country_counts: HashMap::new(),
            }),
            suspicious_ratio: 0.2,
            history_cap: DEMO_HISTORY_CAP,
        }
    }

    fn snapshot_at(&self, now_secs: i64) -> Result<FeedSnapshot, FeedError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| FeedError::Fetch(format!("demo feed unavailable: {e}")))?;
        let state = &mut *guard;

        let burst = state.rng.gen_range(0..=4);
        for _ in 0..burst {
            let &(lat, lon, country) = DEMO_CITIES
                .choose(&mut state.rng)
                .unwrap_or(&DEMO_CITIES[0]);
            let index = state.next_index;
            state.next_index += 1;
            let octets: [u8; 4] = state.rng.gen();
            state.events.push_back(TrafficEvent {
                index,
                lat: (lat + state.rng.gen_range(-2.0..2.0)).clamp(-90.0, 90.0),
                lon: (lon + state.rng.gen_range(-2.0..2.0)).clamp(-180.0, 180.0),
                suspicious: state.rng.gen_bool(self.suspicious_ratio),
                ip: Some(format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])),
                country: Some(country.to_string()),
                timestamp: Some(now_secs),
            });
            state.request_times.push_back(now_secs);
            *state.country_counts.entry(country).or_insert(0) += 1;
        }
        trim_history(&mut state.events, self.history_cap);

        let start = now_secs - ACTIVITY_WINDOW_SECS + 1;
        while state.request_times.front().is_some_and(|&t| t < start) {
            state.request_times.pop_front();
        }

        let mut per_second: HashMap<i64, u64> = HashMap::new();
        for &t in &state.request_times {
            *per_second.entry(t).or_insert(0) += 1;
        }
        let activity = (start..=now_secs)
            .map(|timestamp| ActivitySample {
                timestamp,
                count: per_second.get(&timestamp).copied().unwrap_or(0),
            })
            .collect();

        let mut top: Vec<_> = state.country_counts.iter().collect();
        top.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        let top_talkers = top
            .into_iter()
            .take(TOP_N_COUNTRIES)
            .map(|(country, &count)| TopTalker {
                country: Some(country.to_string()),
                count,
            })
            .collect();

        Ok(FeedSnapshot {
            events: state.events.iter().cloned().collect(),
            activity,
            top_talkers,
        })
    }
}

/// Drop the oldest events beyond `cap`
fn trim_history(events: &mut VecDeque<TrafficEvent>, cap: usize) {
    let excess = events.len().saturating_sub(cap);
    events.drain(..excess);
}

impl FeedSource for DemoFeed {
    fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        self.snapshot_at(chrono::Utc::now().timestamp())
    }

    fn describe(&self) -> String {
        "demo feed".to_string()
    }
}
