use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

use super::queue::ReadyQueue;
use crate::error::SystemError;
use crate::log_scheduler;
use crate::logging;
use crate::system::SystemInner;

/// Fixed set of named OS threads sharing one ready queue.
///
/// ## Core Algorithm
/// 1. Pop an actor id, parking for `idle_wait` when the queue is empty
/// 2. Run exactly one step of that actor
/// 3. The step re-queues the actor at the tail if it has more work
/// 4. Repeat until halted
pub(crate) struct WorkerPool {
    halt: Arc<AtomicBool>,
    queue: Arc<ReadyQueue>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn start(
        system: Weak<SystemInner>,
        queue: Arc<ReadyQueue>,
        pool_size: usize,
        thread_name_prefix: &str,
        idle_wait: Duration,
    ) -> Result<Self, SystemError> {
        let mut pool = Self {
            halt: Arc::new(AtomicBool::new(false)),
            queue,
            threads: Vec::with_capacity(pool_size),
        };
        // Workers log through whatever subscriber is current here.
        let dispatch = logging::current_subscriber();

        for index in 0..pool_size {
            let name = format!("{}{}", thread_name_prefix, index);
            let worker = Worker {
                index,
                system: system.clone(),
                queue: pool.queue.clone(),
                halt: pool.halt.clone(),
                idle_wait,
            };
            let dispatch = dispatch.clone();
            let spawned = thread::Builder::new()
                .name(name.clone())
                .spawn(move || tracing::dispatcher::with_default(&dispatch, || worker.run()));

            match spawned {
                Ok(handle) => pool.threads.push(handle),
                Err(e) => {
                    pool.halt_and_join();
                    return Err(SystemError::ThreadSetupError(format!(
                        "failed to spawn {}: {}",
                        name, e
                    )));
                }
            }
        }

        log_scheduler!("shared-pool", "started", workers = pool_size);
        Ok(pool)
    }

    pub(crate) fn size(&self) -> usize {
        self.threads.len()
    }

    /// Stops every worker after its current step and waits for it. A
    /// worker calling this skips joining itself.
    pub(crate) fn halt_and_join(&mut self) {
        self.halt.store(true, Ordering::SeqCst);
        self.queue.wake_all();

        let current = thread::current().id();
        for handle in self.threads.drain(..) {
            if handle.thread().id() == current {
                continue;
            }
            if let Err(e) = handle.join() {
                error!(panic = ?e, "worker thread panicked");
            }
        }
        log_scheduler!("shared-pool", "halted");
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size())
            .field("halted", &self.halt.load(Ordering::Relaxed))
            .finish()
    }
}

struct Worker {
    index: usize,
    system: Weak<SystemInner>,
    queue: Arc<ReadyQueue>,
    halt: Arc<AtomicBool>,
    idle_wait: Duration,
}

impl Worker {
    fn run(self) {
        debug!(worker = self.index, "worker running");
        while !self.halt.load(Ordering::SeqCst) {
            let Some(id) = self.queue.pop_timeout(self.idle_wait) else {
                continue;
            };
            if self.halt.load(Ordering::SeqCst) {
                break;
            }
            let Some(system) = self.system.upgrade() else {
                break;
            };
            super::run_step(&system, id);
        }
        debug!(worker = self.index, "worker stopped");
    }
}
