//! One poll's worth of ingestion: fetch, diff against the cursor, apply.
//!
//! `IngestionCycle` is the only writer of the cursor, marker store, activity
//! series and stats. A cycle either applies completely or, on failure, leaves
//! all of them untouched.

use crate::activity::{ActivitySeries, TopTalker, TrafficStats};
use crate::cursor::Cursor;
use crate::error::FeedError;
use crate::feed::{FeedSnapshot, FeedSource, TrafficEvent};
use crate::geo::lat_lon_to_vector3;
use crate::markers::{Classification, MarkerStore};
use std::time::{Duration, Instant};

/// Markers live on the unit sphere; views scale to screen size
pub const GLOBE_RADIUS: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Diffing,
    Applying,
    Failed,
}

impl CyclePhase {
    pub fn label(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Fetching => "fetching",
            CyclePhase::Diffing => "diffing",
            CyclePhase::Applying => "applying",
            CyclePhase::Failed => "failed",
        }
    }
}

/// Running totals across cycles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleCounters {
    pub succeeded: u64,
    pub failed: u64,
    pub ingested: u64,
    /// Successful polls of a non-empty history that held nothing new
    pub unchanged: u64,
}

/// Outcome of a successful cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub new_markers: usize,
    pub cursor: Option<usize>,
    pub stats: TrafficStats,
}

pub struct IngestionCycle {
    phase: CyclePhase,
    cursor: Cursor,
    markers: MarkerStore,
    activity: ActivitySeries,
    top_talkers: Vec<TopTalker>,
    stats: TrafficStats,
    counters: CycleCounters,
    last_error: Option<FeedError>,
}

impl IngestionCycle {
    pub fn new(marker_ttl: Duration, max_markers: usize) -> Self {
        Self {
            phase: CyclePhase::Idle,
            cursor: Cursor::new(),
            markers: MarkerStore::new(marker_ttl, max_markers),
            activity: ActivitySeries::new(),
            top_talkers: Vec::new(),
            stats: TrafficStats::default(),
            counters: CycleCounters::default(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Eviction happens on the render side; nothing else should mutate here
    pub fn markers_mut(&mut self) -> &mut MarkerStore {
        &mut self.markers
    }

    pub fn activity(&self) -> &ActivitySeries {
        &self.activity
    }

    pub fn top_talkers(&self) -> &[TopTalker] {
        &self.top_talkers
    }

    pub fn stats(&self) -> TrafficStats {
        self.stats
    }

    pub fn counters(&self) -> CycleCounters {
        self.counters
    }

    /// Error from the most recent cycle, cleared by the next success
    pub fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    /// A fetch has been issued and the cycle is waiting on it
    pub fn begin_fetch(&mut self) {
        self.phase = CyclePhase::Fetching;
    }

    /// Finish the cycle with the fetch outcome
    pub fn complete(
        &mut self,
        result: Result<FeedSnapshot, FeedError>,
        now: Instant,
    ) -> Result<CycleReport, FeedError> {
        match result {
            Ok(snapshot) => Ok(self.apply(snapshot, now)),
            Err(e) => {
                self.phase = CyclePhase::Failed;
                tracing::warn!(kind = e.kind(), error = %e, "poll failed, keeping previous state");
                self.counters.failed += 1;
                self.last_error = Some(e.clone());
                self.phase = CyclePhase::Idle;
                Err(e)
            }
        }
    }

    /// Fetch and apply synchronously
    pub fn run_cycle(
        &mut self,
        source: &dyn FeedSource,
        now: Instant,
    ) -> Result<CycleReport, FeedError> {
        self.begin_fetch();
        let result = source.fetch();
        self.complete(result, now)
    }

    fn apply(&mut self, snapshot: FeedSnapshot, now: Instant) -> CycleReport {
        self.phase = CyclePhase::Diffing;
        let start = self.cursor.next_unprocessed_start_index();
        let available = snapshot.events.last().map_or(0, |e| e.index + 1);
        if available < start {
            tracing::warn!(
                available,
                cursor = start,
                "feed history is shorter than already ingested, waiting for it to catch up"
            );
        }
        let fresh = new_events(&snapshot.events, start);

        self.phase = CyclePhase::Applying;
        for event in fresh {
            let position = lat_lon_to_vector3(event.lat, event.lon, GLOBE_RADIUS);
            self.markers
                .insert(position, Classification::from_flag(event.suspicious), now);
            tracing::trace!(
                index = event.index,
                ip = event.ip.as_deref().unwrap_or("-"),
                country = event.country.as_deref().unwrap_or("-"),
                timestamp = event.timestamp,
                suspicious = event.suspicious,
                "marker added"
            );
        }
        if let Some(last) = fresh.last() {
            self.cursor.advance_to(last.index);
        }
        let new_markers = fresh.len();
        if new_markers == 0 && !snapshot.events.is_empty() {
            // A source that caps its history stops growing once full
            self.counters.unchanged += 1;
            tracing::debug!(
                available,
                cursor = ?self.cursor.current(),
                unchanged = self.counters.unchanged,
                "poll returned no new events"
            );
        }

        self.activity.replace(snapshot.activity);
        self.top_talkers = snapshot.top_talkers;
        self.stats = TrafficStats::from_markers(self.markers.snapshot());

        self.counters.succeeded += 1;
        self.counters.ingested += new_markers as u64;
        self.last_error = None;
        self.phase = CyclePhase::Idle;

        tracing::debug!(
            new_markers,
            total = self.stats.total_markers,
            suspicious = self.stats.suspicious_markers,
            "cycle applied"
        );

        CycleReport {
            new_markers,
            cursor: self.cursor.current(),
            stats: self.stats,
        }
    }
}

/// Contiguous suffix of `events` at or beyond `start`
pub fn new_events(events: &[TrafficEvent], start: usize) -> &[TrafficEvent] {
    let first = events.partition_point(|e| e.index < start);
    &events[first..]
}
