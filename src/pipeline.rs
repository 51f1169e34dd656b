//! Poller, ingestion and both sync stages wired together.
//!
//! Owned by whichever loop drives it (the terminal view or `tail`); every
//! method runs on that loop's thread.

use crate::chart_sync::{ChartSync, SeriesSink};
use crate::error::FeedError;
use crate::feed::poller::{Poller, Tick};
use crate::feed::FeedSource;
use crate::ingest::{CycleReport, IngestionCycle};
use crate::render_sync::{MarkerSink, RenderSync, SyncReport};
use crate::settings::FeedSettings;
use std::sync::Arc;
use std::time::Instant;

pub struct Pipeline<M: MarkerSink, C: SeriesSink> {
    poller: Poller,
    ingest: IngestionCycle,
    render: RenderSync<M>,
    chart: ChartSync<C>,
}

impl<M: MarkerSink, C: SeriesSink> Pipeline<M, C> {
    pub fn new(
        source: Arc<dyn FeedSource>,
        feed: &FeedSettings,
        markers: M,
        series: C,
        start: Instant,
    ) -> Self {
        Self {
            poller: Poller::new(source, feed.poll_interval(), start),
            ingest: IngestionCycle::new(feed.marker_ttl(), feed.max_markers),
            render: RenderSync::new(markers),
            chart: ChartSync::new(series),
        }
    }

    /// Start a fetch if one is due and apply any that finished
    pub fn poll(&mut self, now: Instant) -> Vec<Result<CycleReport, FeedError>> {
        if self.poller.tick(now) == Tick::Started {
            self.ingest.begin_fetch();
        }

        let mut outcomes = Vec::new();
        while let Some(result) = self.poller.try_recv() {
            let outcome = self.ingest.complete(result, now);
            if outcome.is_ok() {
                self.chart.push(self.ingest.activity());
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Evict expired markers and draw new ones
    pub fn sync_markers(&mut self, now: Instant) -> SyncReport {
        self.render.sync(self.ingest.markers_mut(), now)
    }

    pub fn ingest(&self) -> &IngestionCycle {
        &self.ingest
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn live_markers(&self) -> usize {
        self.render.live()
    }

    pub fn marker_sink(&self) -> &M {
        self.render.sink()
    }

    pub fn marker_sink_mut(&mut self) -> &mut M {
        self.render.sink_mut()
    }

    pub fn series_sink(&self) -> &C {
        self.chart.sink()
    }

    /// Series handed to the chart so far, one per successful cycle
    pub fn chart_pushes(&self) -> u64 {
        self.chart.pushes()
    }
}
