//! Background auto-play engine
//!
//! `run` returns as soon as the worker thread is spawned. The worker draws
//! outcomes (fanning out over a rayon pool when more than one worker is
//! configured) and folds every outcome key into a shared tally. Callers poll
//! the engine or consume the event channel returned by `run`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use rf_core::{OutcomeKey, SlotResult};
use rf_slot_lab::{PayoutCalculator, ProbabilityTable, RunData, SymbolGenerator, WinningsTable};

use crate::config::AutoPlayConfig;
use crate::error::{AutoPlayError, AutoPlayResult};
use crate::session::{AutoPlayEvent, RunDataSnapshot, SessionState};

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Aggregated outcomes; the count map and the completed counter always move together
#[derive(Default)]
struct Tally {
    counts: RunData,
    completed: u64,
    complete: bool,
}

struct Shared {
    state: RwLock<SessionState>,
    tally: Mutex<Tally>,
    runs_requested: AtomicU64,
    /// Mirror of `Tally::completed` for lock-free polling
    runs_completed: AtomicU64,
    percent: AtomicU8,
    /// Set by `cancel`
    cancelled: AtomicBool,
    /// Set by `cancel` or by a failing worker; stops every batch
    halted: AtomicBool,
    payback: RwLock<f64>,
    failure: RwLock<Option<String>>,
    /// Serializes progress events so they leave in increasing order
    publish: Mutex<()>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Idle),
            tally: Mutex::new(Tally::default()),
            runs_requested: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            percent: AtomicU8::new(0),
            cancelled: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            payback: RwLock::new(0.0),
            failure: RwLock::new(None),
            publish: Mutex::new(()),
        }
    }

    /// Clear everything left by the previous session
    fn reset(&self, runs: u64) {
        {
            let mut tally = self.tally.lock();
            tally.counts.clear();
            tally.completed = 0;
            tally.complete = false;
        }
        self.runs_requested.store(runs, Ordering::SeqCst);
        self.runs_completed.store(0, Ordering::SeqCst);
        self.percent.store(0, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
        self.halted.store(false, Ordering::SeqCst);
        *self.payback.write() = 0.0;
        *self.failure.write() = None;
    }

    #[inline]
    fn should_stop(&self) -> bool {
        self.halted.load(Ordering::Relaxed)
    }

    /// Count one outcome, returning the new completed total
    #[inline]
    fn record(&self, key: OutcomeKey) -> u64 {
        let mut tally = self.tally.lock();
        tally.counts.record(key);
        tally.completed += 1;
        self.runs_completed.store(tally.completed, Ordering::Release);
        tally.completed
    }

    fn publish_progress(&self, completed: u64, total: u64, events: &Sender<AutoPlayEvent>) {
        let percent = (completed as u128 * 100 / total.max(1) as u128).min(100) as u8;
        let _guard = self.publish.lock();
        let previous = self.percent.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            let _ = events.send(AutoPlayEvent::Progress(percent));
        }
    }

    /// Enter a final state; must be the worker's last touch of shared state
    fn set_terminal(&self, state: SessionState) {
        self.tally.lock().complete = state == SessionState::Completed;
        *self.state.write() = state;
    }
}

/// Fixed parameters of one session
#[derive(Debug, Clone, Copy)]
struct RunPlan {
    total: u64,
    reels: usize,
    interval: u64,
}

/// Split `runs` into `workers` near-equal batches
fn split_runs(runs: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let base = runs / workers;
    let extra = runs % workers;
    (0..workers).map(|i| base + u64::from(i < extra)).collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// WORKER
// ═══════════════════════════════════════════════════════════════════════════════

fn run_batch(
    shared: &Shared,
    mut generator: SymbolGenerator,
    runs: u64,
    plan: &RunPlan,
    events: &Sender<AutoPlayEvent>,
) -> SlotResult<()> {
    for _ in 0..runs {
        if shared.should_stop() {
            break;
        }

        let key = generator.spin(plan.reels)?.key()?;
        let completed = shared.record(key);
        if completed % plan.interval == 0 {
            shared.publish_progress(completed, plan.total, events);
        }
    }
    Ok(())
}

fn run_parallel(
    shared: &Shared,
    batches: Vec<(SymbolGenerator, u64)>,
    plan: &RunPlan,
    events: &Sender<AutoPlayEvent>,
) -> AutoPlayResult<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(batches.len())
        .thread_name(|i| format!("rf-autoplay-{}", i))
        .build()
        .map_err(|e| AutoPlayError::WorkerSpawn(e.to_string()))?;

    pool.install(|| {
        batches
            .into_par_iter()
            .try_for_each(|(generator, runs)| {
                run_batch(shared, generator, runs, plan, events)
                    .inspect_err(|_| shared.halted.store(true, Ordering::SeqCst))
            })
    })?;
    Ok(())
}

fn worker_main(
    shared: Arc<Shared>,
    mut batches: Vec<(SymbolGenerator, u64)>,
    plan: RunPlan,
    winnings: WinningsTable,
    events: Sender<AutoPlayEvent>,
) {
    let started = Instant::now();
    let _ = events.send(AutoPlayEvent::Started {
        runs: plan.total,
        workers: batches.len(),
    });

    let session = panic::catch_unwind(AssertUnwindSafe(|| {
        let result = if batches.len() > 1 {
            run_parallel(&shared, batches, &plan, &events)
        } else {
            match batches.pop() {
                Some((generator, runs)) => run_batch(&shared, generator, runs, &plan, &events)
                    .map_err(AutoPlayError::from),
                None => Err(AutoPlayError::WorkerFailed("no batch scheduled".into())),
            }
        };
        finish(&shared, result, &plan, &winnings, &events, started);
    }));

    // A panic must still leave a terminal state behind
    if session.is_err() && *shared.state.read() == SessionState::Running {
        fail(&shared, "worker panicked".into(), &events);
    }
}

fn fail(shared: &Shared, message: String, events: &Sender<AutoPlayEvent>) {
    log::error!("Auto-play failed: {}", message);
    *shared.failure.write() = Some(message.clone());
    shared.set_terminal(SessionState::Failed);
    let _ = events.send(AutoPlayEvent::Failed(message));
}

fn finish(
    shared: &Shared,
    result: AutoPlayResult<()>,
    plan: &RunPlan,
    winnings: &WinningsTable,
    events: &Sender<AutoPlayEvent>,
    started: Instant,
) {
    let payback = result.and_then(|()| {
        if shared.cancelled.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let counts = shared.tally.lock().counts.clone();
        let total_payout = PayoutCalculator::new(winnings).evaluate_batch(&counts)?;
        Ok(Some(total_payout as f64 * 100.0 / plan.total as f64))
    });

    match payback {
        Ok(Some(payback)) => {
            shared.publish_progress(plan.total, plan.total, events);
            *shared.payback.write() = payback;
            shared.set_terminal(SessionState::Completed);
            log::info!(
                "Auto-play completed: {} runs, payback {:.3}% ({:.2?})",
                plan.total,
                payback,
                started.elapsed()
            );
            let _ = events.send(AutoPlayEvent::Completed {
                payback,
                runs: plan.total,
            });
        }
        Ok(None) => {
            let runs_completed = shared.runs_completed.load(Ordering::Acquire);
            shared.set_terminal(SessionState::Cancelled);
            log::info!(
                "Auto-play cancelled after {} of {} runs",
                runs_completed,
                plan.total
            );
            let _ = events.send(AutoPlayEvent::Cancelled { runs_completed });
        }
        Err(e) => fail(shared, e.to_string(), events),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AUTO-PLAY ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs batches of spins in the background
///
/// One session is active at a time. All methods take `&self`, so the engine
/// can be shared between a controlling thread and readers.
pub struct AutoPlayEngine {
    config: AutoPlayConfig,
    shared: Arc<Shared>,
    generator: Mutex<SymbolGenerator>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AutoPlayEngine {
    /// Create a new engine
    pub fn new(config: AutoPlayConfig) -> Self {
        let table = ProbabilityTable::default();
        let generator = match config.seed {
            Some(seed) => SymbolGenerator::with_seed(&table, seed),
            None => SymbolGenerator::new(&table),
        };

        Self {
            config,
            shared: Arc::new(Shared::new()),
            generator: Mutex::new(generator),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AutoPlayConfig {
        &self.config
    }

    /// Start `runs` spins against snapshots of both tables
    ///
    /// Returns the session's event stream; the stream closes after the final
    /// `Completed`, `Cancelled` or `Failed` event.
    pub fn run(
        &self,
        runs: u64,
        probabilities: &ProbabilityTable,
        winnings: &WinningsTable,
    ) -> AutoPlayResult<Receiver<AutoPlayEvent>> {
        if runs == 0 {
            return Err(AutoPlayError::InvalidRunCount(runs));
        }

        self.reap_finished_worker();

        {
            let mut state = self.shared.state.write();
            if *state == SessionState::Running {
                return Err(AutoPlayError::AlreadyRunning);
            }
            self.shared.reset(runs);
            *state = SessionState::Running;
        }

        // The previous worker has already left shared state
        self.join_worker();

        let workers = self.config.resolved_workers(runs);
        let batches: Vec<(SymbolGenerator, u64)> = {
            let mut generator = self.generator.lock();
            generator.sync(probabilities);
            generator.reset();
            split_runs(runs, workers)
                .into_iter()
                .map(|batch| (generator.fork(), batch))
                .collect()
        };

        let plan = RunPlan {
            total: runs,
            reels: winnings.reel_count() as usize,
            interval: self.config.progress_interval(runs),
        };
        let winnings = winnings.clone();
        let shared = Arc::clone(&self.shared);
        let (events, receiver) = crossbeam_channel::unbounded();

        log::info!("Auto-play started: {} runs on {} worker(s)", runs, workers);

        let spawned = thread::Builder::new()
            .name("rf-autoplay".to_string())
            .spawn(move || worker_main(shared, batches, plan, winnings, events));

        match spawned {
            Ok(handle) => {
                *self.worker.lock() = Some(handle);
                Ok(receiver)
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("Failed to spawn auto-play worker: {}", message);
                *self.shared.failure.write() = Some(message.clone());
                self.shared.set_terminal(SessionState::Failed);
                Err(AutoPlayError::WorkerSpawn(message))
            }
        }
    }

    /// Request cooperative cancellation
    pub fn cancel(&self) {
        if self.is_running() {
            log::info!("Auto-play cancellation requested");
        }
        self.shared.cancelled.store(true, Ordering::SeqCst);
        self.shared.halted.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested for the current session
    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        *self.shared.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Last published progress (0-100)
    pub fn progress_percent(&self) -> u8 {
        self.shared.percent.load(Ordering::Acquire)
    }

    /// Payback of the last completed session, 0 otherwise
    pub fn payback_percent(&self) -> f64 {
        *self.shared.payback.read()
    }

    pub fn runs_completed(&self) -> u64 {
        self.shared.runs_completed.load(Ordering::Acquire)
    }

    pub fn runs_requested(&self) -> u64 {
        self.shared.runs_requested.load(Ordering::Acquire)
    }

    /// Error text of a failed session
    pub fn failure(&self) -> Option<String> {
        self.shared.failure.read().clone()
    }

    /// Copy of the aggregated outcomes
    ///
    /// `complete` is only set once a session has completed; cancelled or
    /// failed sessions keep their partial counts readable.
    pub fn aggregated_data_snapshot(&self) -> RunDataSnapshot {
        let tally = self.shared.tally.lock();
        RunDataSnapshot {
            counts: tally.counts.clone(),
            runs_completed: tally.completed,
            runs_requested: self.shared.runs_requested.load(Ordering::Acquire),
            complete: tally.complete,
        }
    }

    /// Block until the current worker exits and return the final state
    pub fn wait(&self) -> SessionState {
        self.join_worker();
        self.state()
    }

    fn join_worker(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            self.join_handle(handle);
        }
    }

    /// Join a worker that has already exited, leaving a live one alone
    fn reap_finished_worker(&self) {
        let finished = {
            let mut worker = self.worker.lock();
            match worker.as_ref() {
                Some(handle) if handle.is_finished() => worker.take(),
                _ => None,
            }
        };
        if let Some(handle) = finished {
            self.join_handle(handle);
        }
    }

    fn join_handle(&self, handle: JoinHandle<()>) {
        if handle.join().is_err() {
            log::error!("Auto-play worker panicked");
            *self.shared.failure.write() = Some("worker panicked".into());
            self.shared.set_terminal(SessionState::Failed);
        }
    }
}

impl Drop for AutoPlayEngine {
    fn drop(&mut self) {
        self.cancel();
        self.join_worker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::Symbol;

    fn engine(seed: u64) -> AutoPlayEngine {
        AutoPlayEngine::new(AutoPlayConfig::default().with_seed(seed))
    }

    #[test]
    fn test_split_runs() {
        assert_eq!(split_runs(10, 3), vec![4, 3, 3]);
        assert_eq!(split_runs(9, 3), vec![3, 3, 3]);
        assert_eq!(split_runs(5, 1), vec![5]);
        assert_eq!(split_runs(7, 0), vec![7]);
    }

    #[test]
    fn test_zero_runs_rejected() {
        let engine = engine(1);
        let result = engine.run(0, &ProbabilityTable::default(), &WinningsTable::default());
        assert!(matches!(result, Err(AutoPlayError::InvalidRunCount(0))));
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn test_run_completes() {
        let engine = engine(7);
        engine
            .run(1000, &ProbabilityTable::default(), &WinningsTable::default())
            .unwrap();
        assert_eq!(engine.wait(), SessionState::Completed);

        let snapshot = engine.aggregated_data_snapshot();
        assert!(snapshot.complete);
        assert_eq!(snapshot.runs_completed, 1000);
        assert_eq!(snapshot.runs_requested, 1000);
        assert_eq!(snapshot.counts.total(), 1000);
        assert_eq!(engine.progress_percent(), 100);
    }

    #[test]
    fn test_payback_matches_evaluate_batch() {
        let engine = engine(11);
        let winnings = WinningsTable::default();
        engine.run(5000, &ProbabilityTable::default(), &winnings).unwrap();
        engine.wait();

        let snapshot = engine.aggregated_data_snapshot();
        let total = PayoutCalculator::new(&winnings)
            .evaluate_batch(&snapshot.counts)
            .unwrap();
        assert_eq!(engine.payback_percent(), total as f64 * 100.0 / 5000.0);
    }

    #[test]
    fn test_all_cherry_pays_exactly() {
        let engine = engine(3);
        let probabilities = ProbabilityTable::with_defaults([0, 100, 0, 0, 0, 0]).unwrap();
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Cherry, 3, 10).unwrap();

        engine.run(2000, &probabilities, &winnings).unwrap();
        assert_eq!(engine.wait(), SessionState::Completed);
        assert_eq!(engine.payback_percent(), 1000.0);

        let snapshot = engine.aggregated_data_snapshot();
        let key = OutcomeKey::for_symbol_count(Symbol::Cherry, 3).unwrap();
        assert_eq!(snapshot.counts.get(key), 2000);
        assert_eq!(snapshot.counts.len(), 1);
    }

    #[test]
    fn test_event_stream_ends_with_completed() {
        let engine = engine(5);
        let events = engine
            .run(100, &ProbabilityTable::default(), &WinningsTable::default())
            .unwrap();
        let events: Vec<_> = events.iter().collect();

        assert!(matches!(events.first(), Some(AutoPlayEvent::Started { runs: 100, workers: 1 })));
        assert!(matches!(events.last(), Some(AutoPlayEvent::Completed { runs: 100, .. })));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(events.contains(&AutoPlayEvent::Progress(100)));
    }

    #[test]
    fn test_seeded_sessions_are_reproducible() {
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();

        let a = engine(42);
        a.run(3000, &probabilities, &winnings).unwrap();
        a.wait();

        let b = engine(42);
        b.run(3000, &probabilities, &winnings).unwrap();
        b.wait();

        assert_eq!(a.aggregated_data_snapshot(), b.aggregated_data_snapshot());
        assert_eq!(a.payback_percent(), b.payback_percent());
    }

    #[test]
    fn test_too_many_reels_fails_session() {
        let engine = engine(9);
        let winnings = WinningsTable::empty(rf_core::MAX_REELS + 1);
        let events = engine.run(10, &ProbabilityTable::default(), &winnings).unwrap();
        assert_eq!(engine.wait(), SessionState::Failed);
        assert!(engine.failure().is_some());
        assert!(matches!(events.iter().last(), Some(AutoPlayEvent::Failed(_))));
        assert_eq!(engine.payback_percent(), 0.0);
    }

    #[test]
    fn test_payout_overflow_fails_session() {
        let engine = engine(13);
        let probabilities = ProbabilityTable::with_defaults([0, 100, 0, 0, 0, 0]).unwrap();
        let mut winnings = WinningsTable::empty(3);
        winnings.set(Symbol::Cherry, 3, i64::MAX).unwrap();

        let events = engine.run(3, &probabilities, &winnings).unwrap();
        assert_eq!(engine.wait(), SessionState::Failed);
        assert!(engine.failure().is_some_and(|m| m.contains("exceeds")));
        assert!(matches!(events.iter().last(), Some(AutoPlayEvent::Failed(_))));
        assert_eq!(engine.payback_percent(), 0.0);

        engine
            .run(100, &ProbabilityTable::default(), &WinningsTable::default())
            .unwrap();
        assert_eq!(engine.wait(), SessionState::Completed);
        assert_eq!(engine.failure(), None);
    }

    #[test]
    fn test_run_reaps_panicked_worker() {
        let engine = engine(14);
        *engine.shared.state.write() = SessionState::Running;
        let handle = thread::spawn(|| {
            panic!("batch exploded");
        });
        while !handle.is_finished() {
            thread::yield_now();
        }
        *engine.worker.lock() = Some(handle);

        engine
            .run(50, &ProbabilityTable::default(), &WinningsTable::default())
            .unwrap();
        assert_eq!(engine.wait(), SessionState::Completed);
        assert_eq!(engine.runs_completed(), 50);
    }

    #[test]
    fn test_failed_session_accepts_next_run_without_wait() {
        let engine = engine(15);
        let winnings = WinningsTable::empty(rf_core::MAX_REELS + 1);
        let events = engine.run(10, &ProbabilityTable::default(), &winnings).unwrap();
        // Drain to the terminal event instead of joining
        assert!(matches!(events.iter().last(), Some(AutoPlayEvent::Failed(_))));

        let events = engine
            .run(10, &ProbabilityTable::default(), &WinningsTable::default())
            .unwrap();
        assert!(matches!(events.iter().last(), Some(AutoPlayEvent::Completed { runs: 10, .. })));
    }

    #[test]
    fn test_consecutive_seeded_sessions_differ() {
        let engine = engine(42);
        let probabilities = ProbabilityTable::default();
        let winnings = WinningsTable::default();

        engine.run(3000, &probabilities, &winnings).unwrap();
        engine.wait();
        let first = engine.aggregated_data_snapshot();

        engine.run(3000, &probabilities, &winnings).unwrap();
        engine.wait();
        let second = engine.aggregated_data_snapshot();

        assert_eq!(first.runs_completed, second.runs_completed);
        assert_ne!(first.counts, second.counts);
    }
}
