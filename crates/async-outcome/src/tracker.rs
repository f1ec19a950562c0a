//! Generation-guarded outcome tracker
//!
//! Every attachment bumps an owned generation counter. A settling computation only
//! writes its result if its generation is still the current one; the comparison and
//! the write happen inside a single `watch` update, so a slow request can never
//! overwrite the result of a newer one.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::watch;

use crate::AsyncOutcome;

/// Identity of one attached computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current generation together with its outcome, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T, E> {
    pub generation: Generation,
    pub outcome: AsyncOutcome<T, E>,
}

type SharedState<T, E> = Arc<watch::Sender<Snapshot<T, E>>>;

/// Tracks the outcome of whichever computation was attached last.
///
/// Cloning yields another handle onto the same state.
pub struct OutcomeTracker<T, E> {
    state: SharedState<T, E>,
}

impl<T, E> Clone for OutcomeTracker<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T, E> Default for OutcomeTracker<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> OutcomeTracker<T, E> {
    /// Create a tracker with nothing attached yet. Its outcome reads `Pending`.
    pub fn new() -> Self {
        let (state, _) = watch::channel(Snapshot {
            generation: Generation(0),
            outcome: AsyncOutcome::Pending,
        });
        Self {
            state: Arc::new(state),
        }
    }

    pub fn generation(&self) -> Generation {
        self.state.borrow().generation
    }

    /// Start a new attachment without spawning anything.
    ///
    /// The outcome switches to `Pending` before this returns, superseding whatever
    /// the previous attachment produced or is still going to produce.
    pub fn begin(&self) -> Attachment<T, E> {
        let mut generation = Generation(0);
        self.state.send_modify(|snapshot| {
            snapshot.generation = snapshot.generation.next();
            snapshot.outcome = AsyncOutcome::Pending;
            generation = snapshot.generation;
        });
        debug!("outcome_tracker: attached {}", generation);
        Attachment {
            generation,
            state: Arc::clone(&self.state),
            settled: false,
        }
    }

    /// Change feed for readers that re-render on every applied transition.
    /// Suppressed stale results never produce a notification.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T, E>> {
        self.state.subscribe()
    }
}

impl<T: Clone, E: Clone> OutcomeTracker<T, E> {
    pub fn outcome(&self) -> AsyncOutcome<T, E> {
        self.state.borrow().outcome.clone()
    }

    pub fn snapshot(&self) -> Snapshot<T, E> {
        self.state.borrow().clone()
    }

    /// Wait until the current attachment leaves `Pending` and return its outcome.
    ///
    /// If a newer computation is attached while waiting, waits for that one instead.
    /// Never returns while nothing has been attached.
    pub async fn settled(&self) -> AsyncOutcome<T, E> {
        let mut receiver = self.state.subscribe();
        loop {
            {
                let snapshot = receiver.borrow_and_update();
                if !snapshot.outcome.is_pending() {
                    return snapshot.outcome.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return self.outcome();
            }
        }
    }
}

impl<T, E> OutcomeTracker<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Attach `computation` and drive it on the Tokio runtime.
    ///
    /// Must be called from within a runtime. The computation is never cancelled;
    /// once superseded, its result is simply discarded when it arrives.
    ///
    /// If the computation panics, nothing is delivered: the outcome stays `Pending`
    /// (and `settled` keeps waiting) until the next attachment. A warning is logged.
    pub fn attach<F>(&self, computation: F) -> Generation
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let attachment = self.begin();
        let generation = attachment.generation();
        tokio::spawn(async move {
            let result = computation.await;
            attachment.settle(result);
        });
        generation
    }
}

/// Handle for one attachment, used to deliver its result.
///
/// Dropping a current attachment without settling it leaves the outcome `Pending`.
pub struct Attachment<T, E> {
    generation: Generation,
    state: SharedState<T, E>,
    settled: bool,
}

impl<T, E> Attachment<T, E> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether no newer attachment has been made since this one.
    pub fn is_current(&self) -> bool {
        self.state.borrow().generation == self.generation
    }

    /// Deliver the result. Returns `false` (and changes nothing) if a newer
    /// computation has been attached in the meantime.
    pub fn settle(mut self, result: Result<T, E>) -> bool {
        self.settled = true;
        let generation = self.generation;
        let applied = self.state.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.outcome = result.into();
            true
        });
        if applied {
            debug!("outcome_tracker: {} settled", generation);
        } else {
            debug!("outcome_tracker: dropped stale result of {}", generation);
        }
        applied
    }
}

impl<T, E> Drop for Attachment<T, E> {
    fn drop(&mut self) {
        if !self.settled && self.is_current() {
            warn!(
                "outcome_tracker: {} dropped without a result, outcome stays pending",
                self.generation
            );
        }
    }
}

impl<T, E> fmt::Debug for Attachment<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Generation, OutcomeTracker};
    use crate::AsyncOutcome;
    use tokio::sync::oneshot;

    type Tracker = OutcomeTracker<u32, String>;

    async fn let_spawned_tasks_run() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn attach_channel(tracker: &Tracker) -> (Generation, oneshot::Sender<Result<u32, String>>) {
        let (tx, rx) = oneshot::channel();
        let generation = tracker.attach(async move {
            rx.await
                .unwrap_or_else(|_| Err("sender dropped".to_string()))
        });
        (generation, tx)
    }

    #[test]
    fn fresh_tracker_reads_pending() {
        let tracker = Tracker::new();
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);
        assert_eq!(tracker.generation().value(), 0);
    }

    #[test]
    fn begin_resets_to_pending_regardless_of_prior_outcome() {
        let tracker = Tracker::new();

        let first = tracker.begin();
        assert!(first.settle(Ok(1)));
        assert_eq!(tracker.outcome(), AsyncOutcome::Loaded(1));

        let second = tracker.begin();
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);
        assert!(second.settle(Err("nope".to_string())));
        assert_eq!(tracker.outcome(), AsyncOutcome::Failed("nope".to_string()));

        let _third = tracker.begin();
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);
        assert_eq!(tracker.generation().value(), 3);
    }

    #[test]
    fn superseded_attachment_cannot_overwrite_newer_one() {
        let tracker = Tracker::new();
        let older = tracker.begin();
        let newer = tracker.begin();
        assert!(!older.is_current());
        assert!(newer.is_current());

        assert!(!older.settle(Ok(1)));
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);

        assert!(newer.settle(Ok(2)));
        assert_eq!(tracker.outcome(), AsyncOutcome::Loaded(2));
    }

    #[test]
    fn late_stale_result_after_newer_settled_is_dropped() {
        let tracker = Tracker::new();
        let older = tracker.begin();
        let newer = tracker.begin();

        assert!(newer.settle(Ok(2)));
        assert!(!older.settle(Err("late".to_string())));
        assert_eq!(tracker.outcome(), AsyncOutcome::Loaded(2));
    }

    #[test]
    fn stale_settle_does_not_notify_subscribers() {
        let tracker = Tracker::new();
        let mut receiver = tracker.subscribe();

        let older = tracker.begin();
        let _newer = tracker.begin();
        assert!(receiver.has_changed().unwrap());
        let _ = receiver.borrow_and_update();

        assert!(!older.settle(Ok(1)));
        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test]
    async fn attach_reports_pending_until_computation_settles() {
        let tracker = Tracker::new();
        let (generation, tx) = attach_channel(&tracker);

        assert_eq!(generation, tracker.generation());
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);

        tx.send(Ok(5)).unwrap();
        assert_eq!(tracker.settled().await, AsyncOutcome::Loaded(5));
    }

    #[tokio::test]
    async fn attach_surfaces_failure_as_failed_outcome() {
        let tracker = Tracker::new();
        let (_, tx) = attach_channel(&tracker);

        tx.send(Err("failed to list files".to_string())).unwrap();
        assert_eq!(
            tracker.settled().await,
            AsyncOutcome::Failed("failed to list files".to_string())
        );
    }

    #[tokio::test]
    async fn slow_superseded_computation_never_becomes_visible() {
        let tracker = Tracker::new();
        let (first, tx_a) = attach_channel(&tracker);
        let (second, tx_b) = attach_channel(&tracker);
        assert!(second > first);

        tx_b.send(Ok(2)).unwrap();
        assert_eq!(tracker.settled().await, AsyncOutcome::Loaded(2));

        let mut receiver = tracker.subscribe();
        let _ = receiver.borrow_and_update();

        tx_a.send(Ok(1)).unwrap();
        let_spawned_tasks_run().await;

        assert_eq!(tracker.outcome(), AsyncOutcome::Loaded(2));
        assert!(!receiver.has_changed().unwrap());
        assert_eq!(tracker.snapshot().generation, second);
    }

    #[tokio::test]
    async fn settled_follows_the_newest_attachment() {
        let tracker = Tracker::new();
        let (_, tx_a) = attach_channel(&tracker);

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.settled().await })
        };
        let_spawned_tasks_run().await;

        let (_, tx_b) = attach_channel(&tracker);
        tx_a.send(Ok(1)).unwrap();
        let_spawned_tasks_run().await;
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);

        tx_b.send(Ok(2)).unwrap();
        assert_eq!(waiter.await.unwrap(), AsyncOutcome::Loaded(2));
    }

    #[tokio::test]
    async fn panicked_computation_leaves_pending_until_next_attachment() {
        let tracker = Tracker::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let crashed = tracker.attach(async move { Ok(rx.await.unwrap()) });
        drop(tx);
        let_spawned_tasks_run().await;

        assert_eq!(tracker.generation(), crashed);
        assert_eq!(tracker.outcome(), AsyncOutcome::Pending);

        let (retry, tx) = attach_channel(&tracker);
        assert!(retry > crashed);
        tx.send(Ok(3)).unwrap();
        assert_eq!(tracker.settled().await, AsyncOutcome::Loaded(3));
    }
}
