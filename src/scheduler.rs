//! Scheduler: owns at most one pending timer handle driving the periodic
//! Status Probe, or runs a single synchronous pass in one-shot mode.
//!
//! Enforces "at most one pending probe handle per balancer" unconditionally
//! by storing the handle behind a single `parking_lot::Mutex` slot that every
//! reschedule and `destroy` call goes through.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Matches the health-check tick seen across comparable RPC pool crates.
pub const LB_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct Scheduler {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }

    /// Schedule `pass` to run after `LB_INTERVAL`, replacing any existing
    /// pending handle. `pass` is responsible for rescheduling itself on
    /// completion (see `RpcLoadBalancer::spawn_periodic_probe`).
    ///
    /// The stored handle covers only the sleep, not `pass` itself: once
    /// `LB_INTERVAL` elapses, `pass` is spawned onto its own untracked task
    /// and the sleep-task returns. This keeps `destroy`'s abort from ever
    /// reaching a probe pass that has already started.
    pub fn schedule<F>(&self, pass: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let new_handle = tokio::spawn(async move {
            tokio::time::sleep(LB_INTERVAL).await;
            tokio::spawn(pass);
        });

        let mut slot = self.handle.lock();
        if let Some(old) = slot.replace(new_handle) {
            old.abort();
        }
    }

    /// Cancel the pending handle, if any. This only ever aborts the sleep
    /// between passes: by the time a pass is actually running it's on its
    /// own untracked task (see `schedule`), so in-flight probe HTTP
    /// requests are never individually cancelled — they complete or time
    /// out on their own.
    pub fn destroy(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            trace!("scheduler: pending handle cancelled");
        }
    }

    /// Whether a pass is currently scheduled. Used by tests to assert
    /// `destroy` leaves no pending scheduled work.
    pub fn has_pending(&self) -> bool {
        self.handle.lock().is_some()
    }
}

/// Guard passed into a scheduled pass so it can tell, after `destroy` was
/// called mid-flight, not to resurrect scheduling by rescheduling itself.
#[derive(Clone)]
pub struct ShutdownFlag(Arc<std::sync::atomic::AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self(Arc::new(std::sync::atomic::AtomicBool::new(false)))
    }

    pub fn shutdown(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}
