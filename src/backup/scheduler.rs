//! Automatic backup scheduler
//!
//! A background thread that sleeps in short ticks up to the profile's
//! interval, runs an Auto backup through the orchestrator, and repeats until
//! its cancellation token is set. `stop` joins the thread, so no backup is in
//! flight once it returns.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{GameProfile, MAX_AUTO_SAVE_INTERVAL_SECS};

use super::naming::ArchiveClass;
use super::orchestrator::{BackupOrchestrator, BackupReport};

/// Shared stop signal for one monitoring session
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives the report of every scheduled run
pub trait ReportSink: Send + Sync {
    fn deliver(&self, report: BackupReport);
}

impl<F> ReportSink for F
where
    F: Fn(BackupReport) + Send + Sync,
{
    fn deliver(&self, report: BackupReport) {
        self(report)
    }
}

struct Running {
    profile: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Two states: stopped (no thread) and running (one thread per scheduler)
pub struct AutoSaveScheduler {
    orchestrator: Arc<BackupOrchestrator>,
    tick: Duration,
    sink: Arc<dyn ReportSink>,
    running: Option<Running>,
}

impl AutoSaveScheduler {
    pub fn new(orchestrator: Arc<BackupOrchestrator>, tick: Duration, sink: Arc<dyn ReportSink>) -> Self {
        Self {
            orchestrator,
            tick: tick.max(Duration::from_millis(1)),
            sink,
            running: None,
        }
    }

    /// Begin scheduled backups for `profile`
    pub fn start(&mut self, profile: GameProfile, token: CancellationToken) -> GameSaveResult<()> {
        if let Some(running) = &self.running {
            return Err(GameSaveError::Session(format!(
                "scheduler already running for {}",
                running.profile
            )));
        }
        if profile.auto_save_interval_secs == 0 {
            return Err(GameSaveError::Validation(
                "auto-save interval must be greater than 0".into(),
            ));
        }
        if profile.auto_save_interval_secs > MAX_AUTO_SAVE_INTERVAL_SECS {
            return Err(GameSaveError::Validation(format!(
                "auto-save interval must be at most {} seconds",
                MAX_AUTO_SAVE_INTERVAL_SECS
            )));
        }

        let interval = Duration::from_secs(profile.auto_save_interval_secs);
        let tick = self.tick;
        let orchestrator = Arc::clone(&self.orchestrator);
        let sink = Arc::clone(&self.sink);
        let loop_token = token.clone();
        let name = profile.name.clone();

        let handle = thread::Builder::new()
            .name(format!("autosave-{}", profile.name))
            .spawn(move || {
                info!(profile = %profile.name, interval_secs = interval.as_secs(), "scheduler started");
                while sleep_until_due(interval, tick, &loop_token) {
                    let iteration = panic::catch_unwind(AssertUnwindSafe(|| {
                        let report = orchestrator.run_backup(&profile, ArchiveClass::Auto);
                        sink.deliver(report);
                    }));
                    if iteration.is_err() {
                        error!(profile = %profile.name, "scheduled backup panicked, continuing");
                    }
                }
                info!(profile = %profile.name, "scheduler stopped");
            })
            .map_err(|e| GameSaveError::Session(format!("Failed to start scheduler: {}", e)))?;

        self.running = Some(Running {
            profile: name,
            token,
            handle,
        });
        Ok(())
    }

    /// Cancel and wait for the loop to exit. Does nothing when stopped.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
            if running.handle.join().is_err() {
                warn!(profile = %running.profile, "scheduler thread ended with a panic");
            }
            debug!(profile = %running.profile, "scheduler joined");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Profile currently being backed up, if any
    pub fn active_profile(&self) -> Option<&str> {
        self.running.as_ref().map(|r| r.profile.as_str())
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sleep in `tick` steps until `interval` has passed. False means cancelled.
///
/// An interval too large to represent as an `Instant` is never due.
fn sleep_until_due(interval: Duration, tick: Duration, token: &CancellationToken) -> bool {
    let deadline = Instant::now().checked_add(interval);
    loop {
        if token.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        match deadline {
            Some(deadline) if now >= deadline => return true,
            Some(deadline) => thread::sleep(tick.min(deadline - now)),
            None => thread::sleep(tick),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::clock::Clock;
    use crate::backup::orchestrator::tests::{create_test_orchestrator, create_test_profile};
    use crate::config::settings::{RetentionLimits, RetentionSettings};
    use chrono::{DateTime, Local, TimeZone};
    use std::sync::atomic::AtomicI64;
    use std::sync::mpsc;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Clock that advances one second per reading
    struct SteppingClock(AtomicI64);

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Local> {
            let secs = self.0.fetch_add(1, Ordering::SeqCst);
            Local.timestamp_opt(secs, 0).single().unwrap()
        }
    }

    fn channel_sink() -> (Arc<dyn ReportSink>, mpsc::Receiver<BackupReport>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink: Arc<dyn ReportSink> = Arc::new(move |report: BackupReport| {
            let _ = tx.lock().unwrap().send(report);
        });
        (sink, rx)
    }

    fn limits(auto: u32) -> RetentionSettings {
        RetentionSettings {
            local: RetentionLimits::new(auto, 0),
            mirror: RetentionLimits::unlimited(),
        }
    }

    #[test]
    fn test_basic_lifecycle_keeps_newest_two() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(
            create_test_orchestrator(temp.path(), false, limits(2))
                .with_clock(Arc::new(SteppingClock(AtomicI64::new(1_735_689_600)))),
        );
        let profile = create_test_profile(temp.path(), false).with_interval(1);
        let (sink, rx) = channel_sink();
        let mut scheduler =
            AutoSaveScheduler::new(Arc::clone(&orchestrator), Duration::from_millis(20), sink);

        scheduler.start(profile.clone(), CancellationToken::new()).unwrap();
        let reports: Vec<BackupReport> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(10)).unwrap())
            .collect();
        scheduler.stop();

        assert!(reports.iter().all(|r| r.local_ok && r.class == ArchiveClass::Auto));
        let remaining = orchestrator.local_store().list_archives(&profile.name).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|a| *a > reports[0].identity));
        assert!(!orchestrator
            .local_store()
            .archive_path(&profile.name, &reports[0].identity)
            .exists());
    }

    #[test]
    fn test_stop_is_prompt_with_long_interval() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = create_test_profile(temp.path(), false).with_interval(3600);
        let (sink, rx) = channel_sink();
        let mut scheduler = AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), sink);

        scheduler.start(profile, CancellationToken::new()).unwrap();
        assert!(scheduler.is_running());
        let started = Instant::now();
        scheduler.stop();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!scheduler.is_running());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_second_start_rejected() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = create_test_profile(temp.path(), false).with_interval(3600);
        let (sink, _rx) = channel_sink();
        let mut scheduler = AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), sink);

        scheduler.start(profile.clone(), CancellationToken::new()).unwrap();
        assert!(scheduler.start(profile.clone(), CancellationToken::new()).is_err());
        assert_eq!(scheduler.active_profile(), Some(profile.name.as_str()));

        scheduler.stop();
        scheduler.start(profile, CancellationToken::new()).unwrap();
    }

    #[test]
    fn test_failed_runs_do_not_stop_the_loop() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = GameProfile::new("Missing", temp.path().join("gone")).with_interval(1);
        let (sink, rx) = channel_sink();
        let mut scheduler = AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), sink);

        scheduler.start(profile, CancellationToken::new()).unwrap();
        for _ in 0..2 {
            let report = rx.recv_timeout(Duration::from_secs(10)).unwrap();
            assert!(!report.local_ok);
        }
        scheduler.stop();
    }

    #[test]
    fn test_panicking_iteration_is_survived() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = create_test_profile(temp.path(), false).with_interval(1);

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let calls = AtomicI64::new(0);
        let sink = move |report: BackupReport| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("sink failure");
            }
            let _ = tx.lock().unwrap().send(report);
        };
        let mut scheduler =
            AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), Arc::new(sink));

        scheduler.start(profile, CancellationToken::new()).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(10)).unwrap().local_ok);
        scheduler.stop();
    }

    #[test]
    fn test_oversized_interval_rejected_at_start() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = create_test_profile(temp.path(), false).with_interval(u64::MAX);
        let (sink, _rx) = channel_sink();
        let mut scheduler = AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), sink);

        let err = scheduler.start(profile, CancellationToken::new()).unwrap_err();
        assert!(err.is_validation());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_unrepresentable_deadline_waits_for_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        let waiter = thread::spawn(move || {
            sleep_until_due(Duration::MAX, Duration::from_millis(10), &token)
        });

        thread::sleep(Duration::from_millis(50));
        canceller.cancel();
        assert!(!waiter.join().unwrap());
    }

    #[test]
    fn test_external_cancel_ends_loop() {
        let temp = TempDir::new().unwrap();
        let orchestrator = Arc::new(create_test_orchestrator(temp.path(), false, limits(0)));
        let profile = create_test_profile(temp.path(), false).with_interval(3600);
        let (sink, _rx) = channel_sink();
        let mut scheduler = AutoSaveScheduler::new(orchestrator, Duration::from_millis(20), sink);
        let token = CancellationToken::new();

        scheduler.start(profile, token.clone()).unwrap();
        token.cancel();
        assert!(token.is_cancelled());
        drop(scheduler);
    }
}
