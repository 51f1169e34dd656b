//! Fixed-interval background polling
//!
//! Each due tick runs one fetch on its own thread and hands the result back
//! over a channel, so the frame loop never waits on the network. At most one
//! fetch is in flight: a tick that comes due while the previous fetch is still
//! pending is skipped, not queued.

use super::{FeedSnapshot, FeedSource};
use crate::error::FeedError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub type FetchResult = Result<FeedSnapshot, FeedError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Not due yet
    Idle,
    /// A fetch was started
    Started,
    /// Due, but the previous fetch has not resolved
    Skipped,
}

pub struct Poller {
    source: Arc<dyn FeedSource>,
    interval: Duration,
    next_due: Instant,
    pending: bool,
    skipped: u64,
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
}

impl Poller {
    /// The first tick at or after `start` fetches immediately
    pub fn new(source: Arc<dyn FeedSource>, interval: Duration, start: Instant) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            source,
            interval,
            next_due: start,
            pending: false,
            skipped: 0,
            sender: tx,
            receiver: rx,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn in_flight(&self) -> bool {
        self.pending
    }

    /// Ticks dropped because a fetch was still outstanding
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub fn tick(&mut self, now: Instant) -> Tick {
        if now < self.next_due {
            return Tick::Idle;
        }

        // Fixed cadence; if we fell more than one interval behind, restart from now
        self.next_due += self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }

        if self.pending {
            self.skipped += 1;
            tracing::debug!(skipped = self.skipped, "poll tick skipped, fetch still in flight");
            return Tick::Skipped;
        }

        self.pending = true;
        let source = Arc::clone(&self.source);
        let tx = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("feed-poll".to_string())
            .spawn(move || {
                // A result must always come back or `pending` never clears
                let result = panic::catch_unwind(AssertUnwindSafe(|| source.fetch()))
                    .unwrap_or_else(|payload| {
                        let reason = panic_message(payload.as_ref());
                        tracing::error!(source = %source.describe(), %reason, "feed source panicked");
                        Err(FeedError::Fetch(format!("source panicked: {reason}")))
                    });
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            // Report through the normal path so the cycle fails cleanly
            let _ = self
                .sender
                .send(Err(FeedError::Fetch(format!("could not start poll thread: {e}"))));
        }

        Tick::Started
    }

    /// Completed fetch, if one has arrived
    pub fn try_recv(&mut self) -> Option<FetchResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.pending = false;
                Some(result)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EmptyFeed;

    impl FeedSource for EmptyFeed {
        fn fetch(&self) -> FetchResult {
            Ok(FeedSnapshot::default())
        }

        fn describe(&self) -> String {
            "empty".into()
        }
    }

    struct PanickingFeed;

    impl FeedSource for PanickingFeed {
        fn fetch(&self) -> FetchResult {
            panic!("decoder blew up");
        }

        fn describe(&self) -> String {
            "panicking".into()
        }
    }

    /// Blocks every fetch until the test releases it
    struct Gated {
        gate: Mutex<Receiver<()>>,
    }

    impl FeedSource for Gated {
        fn fetch(&self) -> FetchResult {
            let gate = self.gate.lock().map_err(|e| FeedError::Fetch(e.to_string()))?;
            gate.recv().map_err(|e| FeedError::Fetch(e.to_string()))?;
            Ok(FeedSnapshot::default())
        }

        fn describe(&self) -> String {
            "gated".into()
        }
    }

    fn wait_for(poller: &mut Poller) -> FetchResult {
        for _ in 0..200 {
            if let Some(result) = poller.try_recv() {
                return result;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("fetch never completed");
    }

    #[test]
    fn first_tick_fetches_immediately() {
        let t0 = Instant::now();
        let mut poller = Poller::new(Arc::new(EmptyFeed), Duration::from_secs(2), t0);
        assert_eq!(poller.tick(t0), Tick::Started);
        assert!(poller.in_flight());
        assert!(wait_for(&mut poller).is_ok());
        assert!(!poller.in_flight());
    }

    #[test]
    fn not_due_before_interval() {
        let t0 = Instant::now();
        let mut poller = Poller::new(Arc::new(EmptyFeed), Duration::from_secs(2), t0);
        poller.tick(t0);
        let _ = wait_for(&mut poller);
        assert_eq!(poller.tick(t0 + Duration::from_millis(1999)), Tick::Idle);
        assert_eq!(poller.tick(t0 + Duration::from_millis(2000)), Tick::Started);
    }

    #[test]
    fn overlapping_tick_is_skipped() {
        let (release, gate) = mpsc::channel();
        let source = Gated { gate: Mutex::new(gate) };
        let t0 = Instant::now();
        let interval = Duration::from_secs(2);
        let mut poller = Poller::new(Arc::new(source), interval, t0);

        assert_eq!(poller.tick(t0), Tick::Started);
        assert_eq!(poller.tick(t0 + interval), Tick::Skipped);
        assert_eq!(poller.skipped(), 1);

        release.send(()).unwrap();
        assert!(wait_for(&mut poller).is_ok());

        assert_eq!(poller.tick(t0 + interval * 2), Tick::Started);
        release.send(()).unwrap();
        assert!(wait_for(&mut poller).is_ok());
    }

    #[test]
    fn panicking_fetch_fails_the_cycle_and_frees_the_slot() {
        let t0 = Instant::now();
        let interval = Duration::from_secs(2);
        let mut poller = Poller::new(Arc::new(PanickingFeed), interval, t0);

        assert_eq!(poller.tick(t0), Tick::Started);
        match wait_for(&mut poller) {
            Err(FeedError::Fetch(msg)) => assert!(msg.contains("decoder blew up"), "{msg}"),
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert!(!poller.in_flight());
        assert_eq!(poller.tick(t0 + interval), Tick::Started);
        assert_eq!(poller.skipped(), 0);
        let _ = wait_for(&mut poller);
    }

    #[test]
    fn falling_behind_does_not_burst() {
        let t0 = Instant::now();
        let interval = Duration::from_secs(2);
        let mut poller = Poller::new(Arc::new(EmptyFeed), interval, t0);
        poller.tick(t0);
        let _ = wait_for(&mut poller);

        let late = t0 + interval * 10;
        assert_eq!(poller.tick(late), Tick::Started);
        let _ = wait_for(&mut poller);
        assert_eq!(poller.tick(late + Duration::from_millis(1)), Tick::Idle);
    }
}
