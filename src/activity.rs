//! Request-rate snapshot and derived statistics

use crate::markers::Marker;
use serde::Deserialize;

/// Requests seen by the source during one second
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ActivitySample {
    /// Unix seconds
    pub timestamp: i64,
    pub count: u64,
}

/// Most recent activity window reported by the source.
///
/// Replaced wholesale on every successful poll; never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivitySeries {
    samples: Vec<ActivitySample>,
}

impl ActivitySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, samples: Vec<ActivitySample>) {
        self.samples = samples;
    }

    /// Timestamps and counts as parallel vectors, the shape charts want
    pub fn labels_and_values(&self) -> (Vec<i64>, Vec<f64>) {
        self.samples
            .iter()
            .map(|s| (s.timestamp, s.count as f64))
            .unzip()
    }

    pub fn peak(&self) -> u64 {
        self.samples.iter().map(|s| s.count).max().unwrap_or(0)
    }

    pub fn latest(&self) -> Option<ActivitySample> {
        self.samples.last().copied()
    }
}

/// Per-country hit count from the source's top-N list
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TopTalker {
    #[serde(default)]
    pub country: Option<String>,
    pub count: u64,
}

impl TopTalker {
    pub fn label(&self) -> &str {
        self.country.as_deref().unwrap_or("Unknown")
    }
}

/// Marker totals shown in the stats panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrafficStats {
    pub total_markers: usize,
    pub suspicious_markers: usize,
}

impl TrafficStats {
    pub fn from_markers<'a>(markers: impl Iterator<Item = &'a Marker>) -> Self {
        markers.fold(Self::default(), |mut stats, m| {
            stats.total_markers += 1;
            if m.classification.is_suspicious() {
                stats.suspicious_markers += 1;
            }
            stats
        })
    }

    pub fn normal_markers(&self) -> usize {
        self.total_markers - self.suspicious_markers
    }
}
