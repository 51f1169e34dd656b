//! Per-frame reconciliation of the marker store with whatever draws markers

use crate::geo::Vec3;
use crate::markers::{Classification, MarkerId, MarkerStore};
use std::collections::HashMap;
use std::time::Instant;

/// Fixed look of a marker, chosen by its classification
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    /// Radius in globe units (the globe itself has radius 1)
    pub size: f32,
    pub rgb: (u8, u8, u8),
}

impl MarkerStyle {
    pub const NORMAL: MarkerStyle = MarkerStyle {
        size: 0.008,
        rgb: (0, 255, 0),
    };
    pub const SUSPICIOUS: MarkerStyle = MarkerStyle {
        size: 0.012,
        rgb: (255, 0, 0),
    };

    pub fn for_classification(classification: Classification) -> Self {
        match classification {
            Classification::Normal => Self::NORMAL,
            Classification::Suspicious => Self::SUSPICIOUS,
        }
    }
}

/// Something that can show and hide markers (a scene, a terminal globe, a log)
pub trait MarkerSink {
    type Handle;

    fn add_marker(&mut self, position: Vec3, style: MarkerStyle) -> Self::Handle;
    fn remove_marker(&mut self, handle: Self::Handle);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub removed: usize,
}

pub struct RenderSync<S: MarkerSink> {
    sink: S,
    handles: HashMap<MarkerId, S::Handle>,
    watermark: MarkerId,
}

impl<S: MarkerSink> RenderSync<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            handles: HashMap::new(),
            watermark: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Markers currently handed to the sink
    pub fn live(&self) -> usize {
        self.handles.len()
    }

    /// Evict expired markers, release their handles, then add anything the
    /// store gained since the previous frame.
    pub fn sync(&mut self, store: &mut MarkerStore, now: Instant) -> SyncReport {
        let mut report = SyncReport::default();

        for marker in store.evict_expired(now) {
            // Inserted and expired between two frames: never drawn
            if let Some(handle) = self.handles.remove(&marker.id) {
                self.sink.remove_marker(handle);
                report.removed += 1;
            }
        }

        for marker in store.since(self.watermark) {
            let style = MarkerStyle::for_classification(marker.classification);
            let handle = self.sink.add_marker(marker.position, style);
            self.handles.insert(marker.id, handle);
            report.added += 1;
        }
        self.watermark = store.next_id();

        report
    }
}
