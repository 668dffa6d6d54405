//! Timer-driven and manual ledger fetches.
//!
//! Every fetch takes a sequence number when issued. A response is applied only
//! if no later-issued fetch has been applied already and `stop()` has not run
//! since it was issued, so out-of-order completions can never regress the view.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use hackshield_core::constants::LEDGER_POLL_INTERVAL;
use hackshield_core::error::HackshieldError;
use hackshield_core::traits::BlockService;
use hackshield_core::types::BlockLedgerSnapshot;

use crate::view::LedgerView;

/// What happened to one fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The snapshot was replaced; carries the new block count.
    Applied(usize),
    /// The fetch failed; the previous snapshot was kept.
    Failed(HackshieldError),
    /// A newer fetch was already applied, or the poller was stopped meanwhile.
    Discarded,
}

impl FetchOutcome {
    /// Returns true if the snapshot was replaced.
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied(_))
    }
}

#[derive(Clone, Copy, Debug)]
enum Origin {
    Timer,
    Manual,
}

struct Shared {
    service: Arc<dyn BlockService>,
    next_seq: AtomicU64,
    epoch: AtomicU64,
    applied: Mutex<u64>,
    manual_in_flight: AtomicUsize,
    view: watch::Sender<LedgerView>,
}

impl Shared {
    async fn fetch(&self, origin: Origin) -> FetchOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.epoch.load(Ordering::SeqCst);
        debug!(seq, ?origin, "Fetching ledger");

        let result = self.service.list_blocks().await;

        // Held across the check and the publish so two completions cannot interleave.
        let mut applied = self.applied.lock();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(seq, "Poller stopped since issue, dropping response");
            return FetchOutcome::Discarded;
        }
        if seq < *applied {
            debug!(seq, applied = *applied, "Stale ledger response dropped");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(blocks) => {
                *applied = seq;
                let count = blocks.len();
                self.view.send_modify(|view| {
                    view.snapshot = BlockLedgerSnapshot::new(blocks);
                    view.loading = false;
                    view.last_error = None;
                    view.last_applied_sequence = seq;
                });
                debug!(seq, count, "Ledger snapshot replaced");
                FetchOutcome::Applied(count)
            }
            Err(e) => {
                warn!(seq, error = %e, "Ledger fetch failed, keeping previous snapshot");
                let message = e.user_message();
                self.view.send_modify(|view| {
                    view.loading = false;
                    view.last_error = Some(message);
                });
                FetchOutcome::Failed(e)
            }
        }
    }

    fn begin_manual(&self) -> ManualRefresh<'_> {
        let in_flight = self.manual_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish_refreshing(in_flight > 0);
        ManualRefresh(self)
    }

    fn end_manual(&self) {
        let in_flight = self.manual_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.publish_refreshing(in_flight > 0);
    }

    fn publish_refreshing(&self, refreshing: bool) {
        self.view.send_if_modified(|view| {
            let changed = view.refreshing != refreshing;
            view.refreshing = refreshing;
            changed
        });
    }
}

/// Counts one manual fetch as in flight until dropped, including when the
/// `refresh_now` future is cancelled.
struct ManualRefresh<'a>(&'a Shared);

impl Drop for ManualRefresh<'_> {
    fn drop(&mut self) {
        self.0.end_manual();
    }
}

/// Maintains a local [`BlockLedgerSnapshot`] mirrored from the Block Service.
///
/// Must be used from within a Tokio runtime.
pub struct BlockLedgerPoller {
    shared: Arc<Shared>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BlockLedgerPoller {
    /// Creates a stopped poller with the default 5 second interval.
    pub fn new(service: Arc<dyn BlockService>) -> Self {
        Self::with_interval(service, LEDGER_POLL_INTERVAL)
    }

    /// Creates a stopped poller with a custom interval.
    pub fn with_interval(service: Arc<dyn BlockService>, interval: Duration) -> Self {
        let (view, _) = watch::channel(LedgerView::default());
        Self {
            shared: Arc::new(Shared {
                service,
                next_seq: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                applied: Mutex::new(0),
                manual_in_flight: AtomicUsize::new(0),
                view,
            }),
            interval,
            task: Mutex::new(None),
        }
    }

    /// Polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetches immediately, then once per interval until [`stop`](Self::stop).
    ///
    /// Calling `start` on a running poller does nothing.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Ledger poller already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                shared.fetch(Origin::Timer).await;
            }
        }));
        info!(interval_ms = period.as_millis() as u64, "Ledger poller started");
    }

    /// Cancels the timer. Any fetch still in flight is discarded when it resolves.
    pub fn stop(&self) {
        // Bumped under the publish lock: a fetch that has already passed the
        // epoch check finishes publishing before `stop` returns.
        {
            let _applied = self.shared.applied.lock();
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            info!("Ledger poller stopped");
        }
    }

    /// Returns true while the timer is scheduled.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Fetches once outside the timer cadence. The timer is left untouched.
    pub async fn refresh_now(&self) -> FetchOutcome {
        let _manual = self.shared.begin_manual();
        self.shared.fetch(Origin::Manual).await
    }

    /// Current view.
    pub fn view(&self) -> LedgerView {
        self.shared.view.borrow().clone()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> BlockLedgerSnapshot {
        self.shared.view.borrow().snapshot.clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<LedgerView> {
        self.shared.view.subscribe()
    }
}

impl Drop for BlockLedgerPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use hackshield_core::constants::MSG_FETCH_FAILED;
    use hackshield_core::error::Result;
    use hackshield_core::types::{Block, EmbeddedArtifact, SubmissionRequest, VerificationRequest};
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    type Gate = oneshot::Receiver<Result<Vec<Block>>>;

    /// Counts list calls. Calls pop a gate if one is queued and wait on it,
    /// otherwise answer at once with a single block named after the call.
    #[derive(Default)]
    struct FakeLedger {
        calls: AtomicUsize,
        gates: Mutex<VecDeque<Gate>>,
    }

    impl FakeLedger {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn gate(&self) -> oneshot::Sender<Result<Vec<Block>>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().push_back(rx);
            tx
        }
    }

    #[async_trait]
    impl BlockService for FakeLedger {
        async fn create_block(&self, _request: &SubmissionRequest) -> Result<EmbeddedArtifact> {
            unreachable!("ledger only lists")
        }

        async fn verify_block(&self, _request: &VerificationRequest) -> Result<String> {
            unreachable!("ledger only lists")
        }

        async fn list_blocks(&self) -> Result<Vec<Block>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let gate = self.gates.lock().pop_front();
            match gate {
                Some(rx) => rx.await.unwrap_or_else(|_| Ok(Vec::new())),
                None => Ok(vec![block(&format!("call-{}", n))]),
            }
        }
    }

    fn block(hash: &str) -> Block {
        Block {
            hash: hash.into(),
            device_id: "a1b2c3d4e5".into(),
            recipient: "Alice".into(),
            timestamp: "2025-04-03T10:00:00".into(),
        }
    }

    fn hashes(poller: &BlockLedgerPoller) -> Vec<String> {
        poller.snapshot().blocks().iter().map(|b| b.hash.clone()).collect()
    }

    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fetches_immediately_then_every_interval() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());
        assert!(poller.view().loading);

        poller.start();
        settle().await;
        assert_eq!(service.calls(), 1);
        assert!(!poller.view().loading);
        assert_eq!(hashes(&poller), vec!["call-1"]);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(service.calls(), 2);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(service.calls(), 3);
        assert_eq!(hashes(&poller), vec!["call-3"]);

        poller.stop();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(service.calls(), 3);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_one_timer() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());

        poller.start();
        poller.start();
        settle().await;
        sleep(Duration::from_secs(5)).await;
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_snapshot_and_polling_continues() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());

        poller.start();
        settle().await;
        assert_eq!(hashes(&poller), vec!["call-1"]);

        let gate = service.gate();
        sleep(Duration::from_secs(5)).await;
        gate.send(Err(HackshieldError::Fetch(MSG_FETCH_FAILED.into()))).unwrap();
        settle().await;

        let view = poller.view();
        assert_eq!(hashes(&poller), vec!["call-1"]);
        assert_eq!(view.last_error.as_deref(), Some(MSG_FETCH_FAILED));
        assert_eq!(view.last_applied_sequence, 1);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(service.calls(), 3);
        assert_eq!(hashes(&poller), vec!["call-3"]);
        assert_eq!(poller.view().last_error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_manual_refresh_is_discarded() {
        let service = Arc::new(FakeLedger::default());
        let poller = Arc::new(BlockLedgerPoller::new(service.clone()));

        let manual_gate = service.gate();
        let timer_gate = service.gate();

        let manual = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.refresh_now().await }
        });
        settle().await;
        assert!(poller.view().refreshing);

        poller.start();
        settle().await;
        assert_eq!(service.calls(), 2);

        timer_gate.send(Ok(vec![block("newer-1"), block("newer-2")])).unwrap();
        settle().await;
        assert_eq!(hashes(&poller), vec!["newer-1", "newer-2"]);

        manual_gate.send(Ok(vec![block("older")])).unwrap();
        let outcome = manual.await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Discarded));

        let view = poller.view();
        assert_eq!(hashes(&poller), vec!["newer-1", "newer-2"]);
        assert_eq!(view.last_applied_sequence, 2);
        assert!(!view.refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_manual_refresh_wins() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());

        let outcome = poller.refresh_now().await;
        assert!(outcome.is_applied());
        let outcome = poller.refresh_now().await;
        assert!(matches!(outcome, FetchOutcome::Applied(1)));
        assert_eq!(hashes(&poller), vec!["call-2"]);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_response_discarded_after_stop() {
        let service = Arc::new(FakeLedger::default());
        let poller = Arc::new(BlockLedgerPoller::new(service.clone()));

        poller.start();
        settle().await;
        assert_eq!(hashes(&poller), vec!["call-1"]);

        let gate = service.gate();
        let manual = tokio::spawn({
            let poller = Arc::clone(&poller);
            async move { poller.refresh_now().await }
        });
        settle().await;

        poller.stop();
        gate.send(Ok(vec![block("late")])).unwrap();

        assert!(matches!(manual.await.unwrap(), FetchOutcome::Discarded));
        assert_eq!(hashes(&poller), vec!["call-1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_refresh_clears_refreshing() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());

        let _gate = service.gate();
        let timed_out = tokio::time::timeout(Duration::from_secs(1), poller.refresh_now()).await;
        assert!(timed_out.is_err());

        let view = poller.view();
        assert!(!view.refreshing);
        assert_eq!(view.last_applied_sequence, 0);

        let outcome = poller.refresh_now().await;
        assert!(outcome.is_applied());
        assert!(!poller.view().refreshing);
    }

    /// Answers after a short real-time delay so completions race `stop()`.
    #[derive(Default)]
    struct SlowLedger {
        entered: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl BlockService for SlowLedger {
        async fn create_block(&self, _request: &SubmissionRequest) -> Result<EmbeddedArtifact> {
            unreachable!("ledger only lists")
        }

        async fn verify_block(&self, _request: &VerificationRequest) -> Result<String> {
            unreachable!("ledger only lists")
        }

        async fn list_blocks(&self) -> Result<Vec<Block>> {
            self.entered.store(true, Ordering::SeqCst);
            std::thread::sleep(Duration::from_micros(50));
            Ok(vec![block("slow")])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nothing_applied_after_stop_returns() {
        for i in 0..200u64 {
            let service = Arc::new(SlowLedger::default());
            let poller = Arc::new(BlockLedgerPoller::new(service.clone()));
            let manual = tokio::spawn({
                let poller = Arc::clone(&poller);
                async move { poller.refresh_now().await }
            });

            // The fetch must be issued before stop() for its response to be dropped.
            while !service.entered.load(Ordering::SeqCst) {
                std::hint::spin_loop();
            }
            std::thread::sleep(Duration::from_micros(30 + i % 40));
            poller.stop();
            let at_stop = poller.view().last_applied_sequence;

            let outcome = manual.await.unwrap();
            assert_eq!(poller.view().last_applied_sequence, at_stop);
            if at_stop == 0 {
                assert!(matches!(outcome, FetchOutcome::Discarded));
            } else {
                assert!(outcome.is_applied());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service.clone());

        poller.start();
        settle().await;
        poller.stop();

        poller.start();
        settle().await;
        assert_eq!(service.calls(), 2);
        assert_eq!(hashes(&poller), vec!["call-2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_updates() {
        let service = Arc::new(FakeLedger::default());
        let poller = BlockLedgerPoller::new(service);
        let mut rx = poller.subscribe();

        poller.start();
        rx.changed().await.unwrap();
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.snapshot.len(), 1);
        assert_eq!(view.cards()[0].number, 1);
    }
}
