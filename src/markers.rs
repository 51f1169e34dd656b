//! Time-bounded set of globe markers

use crate::geo::Vec3;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Store-local sequence number, increasing in insertion order
pub type MarkerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Normal,
    Suspicious,
}

impl Classification {
    pub fn from_flag(suspicious: bool) -> Self {
        if suspicious {
            Classification::Suspicious
        } else {
            Classification::Normal
        }
    }

    pub fn is_suspicious(&self) -> bool {
        matches!(self, Classification::Suspicious)
    }
}

/// A displayed point for one ingested traffic event
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: Vec3,
    pub classification: Classification,
    pub created_at: Instant,
}

impl Marker {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) > ttl
    }
}

/// Owns every marker currently on the globe.
///
/// Markers are kept in insertion order, which is also `created_at` order, so
/// eviction only ever looks at the front of the queue.
pub struct MarkerStore {
    markers: VecDeque<Marker>,
    displaced: Vec<Marker>,
    ttl: Duration,
    capacity: usize,
    next_id: MarkerId,
}

impl MarkerStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            markers: VecDeque::new(),
            displaced: Vec::new(),
            ttl,
            capacity: capacity.max(1),
            next_id: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Append a marker. When the store is full the oldest marker is displaced
    /// and handed out by the next `evict_expired` call.
    pub fn insert(
        &mut self,
        position: Vec3,
        classification: Classification,
        created_at: Instant,
    ) -> MarkerId {
        // Keep the queue sorted even if a caller's clock stepped backward
        let created_at = match self.markers.back() {
            Some(last) if last.created_at > created_at => last.created_at,
            _ => created_at,
        };

        let id = self.next_id;
        self.next_id += 1;
        self.markers.push_back(Marker {
            id,
            position,
            classification,
            created_at,
        });

        while self.markers.len() > self.capacity {
            if let Some(oldest) = self.markers.pop_front() {
                self.displaced.push(oldest);
            }
        }

        id
    }

    /// Remove and return every marker older than the TTL, plus anything
    /// displaced by the capacity bound since the last call.
    pub fn evict_expired(&mut self, now: Instant) -> Vec<Marker> {
        let mut evicted = std::mem::take(&mut self.displaced);
        while self
            .markers
            .front()
            .is_some_and(|m| m.is_expired(now, self.ttl))
        {
            if let Some(marker) = self.markers.pop_front() {
                evicted.push(marker);
            }
        }
        evicted
    }

    /// Read-only view of current membership, oldest first
    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = &Marker> + '_ {
        self.markers.iter()
    }

    /// Markers with `id >= first`, oldest first
    pub fn since(&self, first: MarkerId) -> impl Iterator<Item = &Marker> + '_ {
        let start = self.markers.partition_point(|m| m.id < first);
        self.markers.range(start..)
    }

    /// Id the next inserted marker will receive
    pub fn next_id(&self) -> MarkerId {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(10_000);

    fn store() -> MarkerStore {
        MarkerStore::new(TTL, 5000)
    }

    #[test]
    fn marker_survives_whole_ttl_window() {
        let mut store = store();
        let t0 = Instant::now();
        store.insert(Vec3::default(), Classification::Normal, t0);

        for ms in [0, 1, 5_000, 9_999, 10_000] {
            let evicted = store.evict_expired(t0 + Duration::from_millis(ms));
            assert!(evicted.is_empty(), "evicted at {ms}ms");
            assert_eq!(store.snapshot().len(), 1);
        }
    }

    #[test]
    fn marker_is_evicted_past_ttl() {
        let mut store = store();
        let t0 = Instant::now();
        let id = store.insert(Vec3::default(), Classification::Suspicious, t0);

        let evicted = store.evict_expired(t0 + Duration::from_millis(10_001));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, id);
        assert_eq!(store.len(), 0);
        assert!(store.evict_expired(t0 + Duration::from_millis(20_000)).is_empty());
    }

    #[test]
    fn eviction_only_takes_expired_prefix() {
        let mut store = store();
        let t0 = Instant::now();
        store.insert(Vec3::default(), Classification::Normal, t0);
        store.insert(Vec3::default(), Classification::Normal, t0 + Duration::from_millis(4_000));
        store.insert(Vec3::default(), Classification::Normal, t0 + Duration::from_millis(8_000));

        let evicted = store.evict_expired(t0 + Duration::from_millis(14_500));
        assert_eq!(evicted.len(), 2);
        assert_eq!(store.len(), 1);
        assert!(store
            .snapshot()
            .all(|m| !m.is_expired(t0 + Duration::from_millis(14_500), TTL)));
    }

    #[test]
    fn ids_increase_and_since_filters() {
        let mut store = store();
        let t0 = Instant::now();
        let a = store.insert(Vec3::default(), Classification::Normal, t0);
        let b = store.insert(Vec3::default(), Classification::Normal, t0);
        let c = store.insert(Vec3::default(), Classification::Normal, t0);
        assert!(a < b && b < c);

        let ids: Vec<_> = store.since(b).map(|m| m.id).collect();
        assert_eq!(ids, vec![b, c]);
        assert_eq!(store.since(store.next_id()).count(), 0);
    }

    #[test]
    fn capacity_displaces_oldest() {
        let mut store = MarkerStore::new(TTL, 2);
        let t0 = Instant::now();
        let first = store.insert(Vec3::default(), Classification::Normal, t0);
        store.insert(Vec3::default(), Classification::Normal, t0);
        store.insert(Vec3::default(), Classification::Suspicious, t0);

        assert_eq!(store.len(), 2);
        let evicted = store.evict_expired(t0);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, first);
    }

    #[test]
    fn backward_clock_is_clamped() {
        let mut store = store();
        let t0 = Instant::now();
        let later = t0 + Duration::from_millis(500);
        store.insert(Vec3::default(), Classification::Normal, later);
        store.insert(Vec3::default(), Classification::Normal, t0);

        let created: Vec<_> = store.snapshot().map(|m| m.created_at).collect();
        assert_eq!(created, vec![later, later]);
    }
}
