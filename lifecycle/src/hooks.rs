//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{LifecycleError, LifecycleResult};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long [`ShutdownHooks::exit`] waits for the hooks to finish.
pub const DEFAULT_EXIT_TIMEOUT: Duration = Duration::from_secs(5);

type Hook = Box<dyn FnOnce() + Send + 'static>;

/// An ordered registry of cleanup callbacks run once at shutdown.
///
/// The registry is `Send + Sync`; share it behind an `Arc` to register from
/// several threads. Running drains the registry, so each hook runs at most
/// once. Hooks registered while a run is in progress are kept for the next
/// run.
///
/// ```no_run
/// use tintline_lifecycle::ShutdownHooks;
///
/// let hooks = ShutdownHooks::new();
/// hooks.register(|| print!("\x1b[0m"));
/// hooks.exit(0);
/// ```
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Mutex<Vec<Hook>>,
}

impl ShutdownHooks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook to run after every hook registered before it.
    pub fn register<F>(&self, hook: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut hooks = self.lock();
        hooks.push(Box::new(hook));
        debug!(registered = hooks.len(), "registered shutdown hook");
    }

    /// Number of hooks waiting to run.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no hook is waiting to run.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run every registered hook with the default timeout.
    pub fn run_all(&self) -> LifecycleResult<()> {
        self.run_all_with_timeout(DEFAULT_EXIT_TIMEOUT)
    }

    /// Run every registered hook, in order, on a dedicated worker thread and
    /// wait at most `timeout` for them to finish.
    ///
    /// A hook that panics is counted and the rest still run. On timeout the
    /// worker is left running in the background; it is not cancelled.
    pub fn run_all_with_timeout(&self, timeout: Duration) -> LifecycleResult<()> {
        let hooks = std::mem::take(&mut *self.lock());
        let total = hooks.len();
        if total == 0 {
            return Ok(());
        }
        info!(count = total, ?timeout, "running shutdown hooks");

        let finished = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();
        let worker_finished = Arc::clone(&finished);
        thread::Builder::new()
            .name("shutdown-hooks".to_string())
            .spawn(move || {
                let mut panicked = 0;
                for hook in hooks {
                    if panic::catch_unwind(AssertUnwindSafe(hook)).is_err() {
                        panicked += 1;
                    }
                    worker_finished.fetch_add(1, Ordering::SeqCst);
                }
                // The receiver is gone once the caller has timed out.
                let _ = tx.send(panicked);
            })?;

        match rx.recv_timeout(timeout) {
            Ok(0) => {
                debug!(count = total, "shutdown hooks completed");
                Ok(())
            }
            Ok(count) => {
                warn!(count, "shutdown hooks panicked");
                Err(LifecycleError::HookPanicked { count })
            }
            Err(RecvTimeoutError::Timeout) => {
                let pending = total - finished.load(Ordering::SeqCst);
                error!(pending, ?timeout, "timed out waiting for shutdown hooks");
                Err(LifecycleError::Timeout { timeout, pending })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let count = total - finished.load(Ordering::SeqCst);
                error!(count, "shutdown worker died");
                Err(LifecycleError::HookPanicked { count })
            }
        }
    }

    /// Run the hooks with [`DEFAULT_EXIT_TIMEOUT`] and exit the process with
    /// `code`, whether or not they all finished.
    pub fn exit(&self, code: i32) -> ! {
        self.exit_with_timeout(code, DEFAULT_EXIT_TIMEOUT)
    }

    /// Run the hooks, waiting at most `timeout`, and exit the process with
    /// `code`.
    pub fn exit_with_timeout(&self, code: i32, timeout: Duration) -> ! {
        if let Err(error) = self.run_all_with_timeout(timeout) {
            error!(%error, code, "exiting with incomplete shutdown");
        }
        std::process::exit(code)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Hook>> {
        // A hook never runs under the lock, so a poisoned list is still intact.
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ShutdownHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownHooks")
            .field("registered", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Instant;
    use tracing_test::traced_test;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Hook) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::clone(&log);
        let make = move |id: u32| -> Hook {
            let log = Arc::clone(&shared);
            Box::new(move || log.lock().unwrap().push(id))
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_registration_order() {
        let hooks = ShutdownHooks::new();
        let (log, make) = recorder();
        for id in 1..=4 {
            hooks.register(make(id));
        }
        assert_eq!(hooks.len(), 4);

        hooks.run_all_with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_run_drains_registry() {
        let hooks = ShutdownHooks::new();
        let (log, make) = recorder();
        hooks.register(make(1));
        hooks.run_all().unwrap();
        assert!(hooks.is_empty());

        hooks.run_all().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_empty_registry_is_ok() {
        let hooks = ShutdownHooks::new();
        assert!(hooks.is_empty());
        assert!(hooks.run_all_with_timeout(Duration::ZERO).is_ok());
    }

    #[test]
    fn test_panicking_hook_does_not_stop_others() {
        let hooks = ShutdownHooks::new();
        let (log, make) = recorder();
        hooks.register(make(1));
        hooks.register(|| panic!("hook failure"));
        hooks.register(make(3));

        match hooks.run_all_with_timeout(Duration::from_secs(5)) {
            Err(LifecycleError::HookPanicked { count }) => assert_eq!(count, 1),
            other => panic!("expected HookPanicked, got {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec![1, 3]);
    }

    #[test]
    #[traced_test]
    fn test_timeout_reports_pending() {
        let hooks = ShutdownHooks::new();
        hooks.register(|| {});
        hooks.register(|| thread::sleep(Duration::from_millis(500)));
        hooks.register(|| {});

        let started = Instant::now();
        match hooks.run_all_with_timeout(Duration::from_millis(50)) {
            Err(LifecycleError::Timeout { timeout, pending }) => {
                assert_eq!(timeout, Duration::from_millis(50));
                assert!((1..=3).contains(&pending));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_millis(450));
        assert!(logs_contain("timed out waiting for shutdown hooks"));
    }

    #[test]
    #[traced_test]
    fn test_logs_registration_and_run() {
        let hooks = ShutdownHooks::new();
        hooks.register(|| {});
        assert!(logs_contain("registered shutdown hook"));
        hooks.run_all().unwrap();
        assert!(logs_contain("running shutdown hooks"));
        assert!(logs_contain("shutdown hooks completed"));
    }

    #[test]
    fn test_register_from_many_threads() {
        let hooks = Arc::new(ShutdownHooks::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let hooks = Arc::clone(&hooks);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let counter = Arc::clone(&counter);
                        hooks.register(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(hooks.len(), 80);
        hooks.run_all().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 80);
    }

    #[test]
    fn test_debug_shows_count() {
        let hooks = ShutdownHooks::new();
        hooks.register(|| {});
        assert_eq!(format!("{hooks:?}"), "ShutdownHooks { registered: 1 }");
    }

    /// Re-run this test binary with only `test` selected and the given
    /// scenario in the environment.
    fn run_child(test: &str, scenario: &str) -> std::process::Output {
        Command::new(std::env::current_exe().unwrap())
            .args(["--exact", test, "--nocapture", "--test-threads=1"])
            .env("TINTLINE_EXIT_SCENARIO", scenario)
            .output()
            .unwrap()
    }

    #[test]
    fn test_exit_runs_hooks_then_exits() {
        if std::env::var("TINTLINE_EXIT_SCENARIO").as_deref() == Ok("clean") {
            let hooks = ShutdownHooks::new();
            hooks.register(|| println!("first hook ran"));
            hooks.register(|| println!("second hook ran"));
            hooks.exit(3);
        }
        let output = run_child("hooks::tests::test_exit_runs_hooks_then_exits", "clean");
        assert_eq!(output.status.code(), Some(3));
        let stdout = String::from_utf8_lossy(&output.stdout);
        let first = stdout.find("first hook ran").unwrap();
        let second = stdout.find("second hook ran").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_exit_does_not_wait_for_stuck_hook() {
        if std::env::var("TINTLINE_EXIT_SCENARIO").as_deref() == Ok("stuck") {
            let hooks = ShutdownHooks::new();
            hooks.register(|| thread::sleep(Duration::from_secs(60)));
            hooks.exit_with_timeout(4, Duration::from_millis(100));
        }
        let started = Instant::now();
        let output = run_child("hooks::tests::test_exit_does_not_wait_for_stuck_hook", "stuck");
        assert_eq!(output.status.code(), Some(4));
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
