//! `tail`: the ingestion pipeline without a terminal, reporting through tracing

use crate::chart_sync::SeriesSink;
use crate::error::FeedError;
use crate::feed::FeedSource;
use crate::geo::Vec3;
use crate::ingest::{CycleReport, IngestionCycle};
use crate::pipeline::Pipeline;
use crate::render_sync::{MarkerSink, MarkerStyle};
use crate::settings::Settings;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest the loop sleeps between checks
const MAX_NAP: Duration = Duration::from_millis(50);

/// Counts markers instead of drawing them
#[derive(Debug, Default)]
pub struct LogSink {
    next_handle: u64,
    live: usize,
    added: u64,
    removed: u64,
}

impl MarkerSink for LogSink {
    type Handle = u64;

    fn add_marker(&mut self, position: Vec3, style: MarkerStyle) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live += 1;
        self.added += 1;
        tracing::trace!(handle, x = position.x, y = position.y, z = position.z, size = style.size, "marker shown");
        handle
    }

    fn remove_marker(&mut self, handle: u64) {
        self.live = self.live.saturating_sub(1);
        self.removed += 1;
        tracing::trace!(handle, "marker hidden");
    }
}

impl LogSink {
    pub fn live(&self) -> usize {
        self.live
    }
}

/// Logs the shape of each series instead of charting it
#[derive(Debug, Default)]
pub struct LogSeries;

impl SeriesSink for LogSeries {
    fn replace_series(&mut self, labels: Vec<i64>, values: Vec<f64>) {
        tracing::debug!(
            samples = labels.len(),
            oldest = labels.first().copied(),
            newest = labels.last().copied(),
            total = values.iter().sum::<f64>(),
            "activity updated"
        );
    }
}

/// What a finished run saw
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TailSummary {
    pub cycles: u64,
    pub failed: u64,
    pub ingested: u64,
    pub unchanged: u64,
    pub chart_pushes: u64,
    pub live_markers: usize,
}

impl fmt::Display for TailSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ok / {} failed, {} events ({} polls with nothing new), {} chart updates, {} on screen",
            self.cycles, self.failed, self.ingested, self.unchanged, self.chart_pushes, self.live_markers
        )
    }
}

/// Run until `max_cycles` cycles (successful or not) have completed, or forever
pub fn run(settings: &Settings, source: Arc<dyn FeedSource>, max_cycles: Option<u64>) -> TailSummary {
    let start = Instant::now();
    let mut pipeline = Pipeline::new(
        source,
        &settings.feed,
        LogSink::default(),
        LogSeries::default(),
        start,
    );
    let evict_every = settings.globe.evict_interval();
    let mut next_evict = start;
    let mut completed: u64 = 0;

    let store = pipeline.ingest().markers();
    tracing::info!(
        source = %pipeline.poller().describe(),
        interval = ?pipeline.poller().interval(),
        ttl = ?store.ttl(),
        capacity = store.capacity(),
        "tailing traffic feed"
    );

    loop {
        let now = Instant::now();
        for outcome in pipeline.poll(now) {
            completed += 1;
            if let Ok(report) = outcome {
                let ingest = pipeline.ingest();
                let activity = ingest.activity();
                tracing::info!(
                    new = report.new_markers,
                    cursor = ?report.cursor,
                    stored = ingest.markers().len(),
                    suspicious = report.stats.suspicious_markers,
                    rps = activity.latest().map_or(0, |s| s.count),
                    peak = activity.peak(),
                    top = ingest.top_talkers().first().map(|t| t.label()).unwrap_or("-"),
                    "cycle"
                );
            }
        }

        if now >= next_evict {
            let report = pipeline.sync_markers(now);
            if report.removed > 0 {
                tracing::debug!(removed = report.removed, live = pipeline.live_markers(), "markers expired");
            }
            next_evict = now + evict_every;
        }

        if max_cycles.is_some_and(|max| completed >= max) {
            break;
        }
        thread::sleep(evict_every.min(MAX_NAP));
    }

    let sink = pipeline.marker_sink();
    tracing::debug!(added = sink.added, removed = sink.removed, "marker sink totals");

    let counters = pipeline.ingest().counters();
    let summary = TailSummary {
        cycles: counters.succeeded,
        failed: counters.failed,
        ingested: counters.ingested,
        unchanged: counters.unchanged,
        chart_pushes: pipeline.chart_pushes(),
        live_markers: pipeline.marker_sink().live(),
    };
    tracing::info!(%summary, "tail finished");
    summary
}

/// One synchronous fetch-and-apply against `source`, nothing drawn
pub fn check(settings: &Settings, source: &dyn FeedSource) -> Result<CycleReport, FeedError> {
    let mut cycle = IngestionCycle::new(settings.feed.marker_ttl(), settings.feed.max_markers);
    let report = cycle.run_cycle(source, Instant::now())?;
    tracing::info!(
        source = %source.describe(),
        events = report.new_markers,
        suspicious = report.stats.suspicious_markers,
        peak = cycle.activity().peak(),
        "feed check passed"
    );
    Ok(report)
}
