//! Request deadlines.
//!
//! Deadlines run as tokio sleep tasks on a one-thread runtime owned by the
//! system. A caller's runtime is never borrowed: it may be blocked by a
//! waiting caller or dropped before the system.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::SystemError;
use crate::sync::lock;

pub(crate) struct TimerDriver {
    handle: Handle,
    owned: Mutex<Option<Runtime>>,
    stopped: AtomicBool,
}

impl TimerDriver {
    pub(crate) fn new(thread_name_prefix: &str) -> Result<Self, SystemError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name(format!("{}timer", thread_name_prefix))
            .enable_time()
            .build()
            .map_err(|e| SystemError::ThreadSetupError(format!("timer runtime: {}", e)))?;
        debug!("timer runtime started");
        Ok(Self {
            handle: runtime.handle().clone(),
            owned: Mutex::new(Some(runtime)),
            stopped: AtomicBool::new(false),
        })
    }

    /// Runs `action` after `delay`. Returns `None` once the driver is shut
    /// down.
    pub(crate) fn schedule<F>(&self, delay: Duration, action: F) -> Option<AbortHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.stopped.load(Ordering::Acquire) {
            return None;
        }
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Some(task.abort_handle())
    }

    /// Stops the runtime without waiting for pending deadlines; later
    /// `schedule` calls are refused.
    pub(crate) fn shutdown(&self) {
        self.stopped.store(true, Ordering::Release);
        if let Some(runtime) = lock(&self.owned).take() {
            runtime.shutdown_background();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        // Dropping a runtime from async code panics; the background
        // shutdown does not.
        self.shutdown();
    }
}

impl fmt::Debug for TimerDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerDriver")
            .field("owned", &lock(&self.owned).is_some())
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_owned_runtime_fires_deadline() {
        let driver = TimerDriver::new("test-").unwrap();
        let (tx, rx) = mpsc::channel();
        driver
            .schedule(Duration::from_millis(5), move || {
                let _ = tx.send(());
            })
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
        driver.shutdown();
    }

    #[test]
    fn test_aborted_deadline_does_not_fire() {
        let driver = TimerDriver::new("test-").unwrap();
        let (tx, rx) = mpsc::channel::<()>();
        let handle = driver
            .schedule(Duration::from_millis(50), move || {
                let _ = tx.send(());
            })
            .unwrap();
        handle.abort();
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        driver.shutdown();
    }

    #[test]
    fn test_driver_built_inside_a_runtime_outlives_it() {
        let ambient = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let driver = ambient.block_on(async { TimerDriver::new("test-").unwrap() });
        drop(ambient);

        let (tx, rx) = mpsc::channel();
        driver
            .schedule(Duration::from_millis(5), move || {
                let _ = tx.send(());
            })
            .unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn test_dropping_inside_async_code_does_not_panic() {
        let ambient = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        ambient.block_on(async {
            let driver = TimerDriver::new("test-").unwrap();
            drop(driver);
        });
    }

    #[test]
    fn test_schedule_after_shutdown_is_refused() {
        let driver = TimerDriver::new("test-").unwrap();
        driver.shutdown();
        assert!(driver.schedule(Duration::from_millis(1), || {}).is_none());
    }
}
