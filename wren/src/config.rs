use std::time::Duration;

use crate::error::SystemError;

pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_millis(10);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 1024;
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "wren-worker-";

// --- Configuration Enums ---

/// Determines who drives actor dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulingMode {
    /// A fixed pool of OS worker threads shared by every actor.
    SharedPool {
        /// Number of worker threads.
        pool_size: usize,
    },
    /// No worker threads. The caller runs ready actors with
    /// `ActorSystem::run_until_idle`, which makes interleavings
    /// reproducible in tests.
    Manual,
}

/// How `ActorSystem::shutdown` treats work that is still queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainPolicy {
    /// Let queued work finish, then stop every actor through its mailbox.
    Graceful,
    /// Stop the workers and terminate every actor in place. Pending
    /// requests fail with `PromiseOrphaned`.
    Immediate,
}

// --- System Configuration ---

/// Configuration for an `ActorSystem`.
#[derive(Clone, Debug)]
pub struct SystemConfig {
    /// Name used in logs.
    pub name: String,

    pub scheduling_mode: SchedulingMode,

    /// How long an idle worker parks before re-checking the halt flag.
    pub idle_wait: Duration,

    /// Deadline applied to requests issued without an explicit timeout.
    /// `None` means such requests wait until answered or orphaned.
    pub default_request_timeout: Option<Duration>,

    /// Upper bound for each waiting phase of a graceful shutdown.
    pub shutdown_timeout: Duration,

    /// Capacity of the diagnostics channel; records beyond it are dropped.
    pub diagnostics_capacity: usize,

    pub thread_name_prefix: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: format!("wren-{}", uuid::Uuid::new_v4().simple()),
            scheduling_mode: SchedulingMode::SharedPool {
                pool_size: num_cpus::get(),
            },
            idle_wait: DEFAULT_IDLE_WAIT,
            default_request_timeout: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            diagnostics_capacity: DEFAULT_DIAGNOSTICS_CAPACITY,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl SystemConfig {
    /// Default configuration with manual scheduling.
    pub fn manual() -> Self {
        Self::default().with_scheduling_mode(SchedulingMode::Manual)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scheduling_mode(mut self, mode: SchedulingMode) -> Self {
        self.scheduling_mode = mode;
        self
    }

    /// Shorthand for `SchedulingMode::SharedPool { pool_size }`.
    pub fn with_pool_size(self, pool_size: usize) -> Self {
        self.with_scheduling_mode(SchedulingMode::SharedPool { pool_size })
    }

    pub fn with_idle_wait(mut self, idle_wait: Duration) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    pub fn with_default_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_request_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn with_diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.diagnostics_capacity = capacity;
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Rejects configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), SystemError> {
        if let SchedulingMode::SharedPool { pool_size: 0 } = self.scheduling_mode {
            return Err(SystemError::ConfigError(
                "shared pool needs at least one worker".to_string(),
            ));
        }
        if self.idle_wait.is_zero() {
            return Err(SystemError::ConfigError(
                "idle_wait must be greater than zero".to_string(),
            ));
        }
        if self.diagnostics_capacity == 0 {
            return Err(SystemError::ConfigError(
                "diagnostics_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();

        assert!(config.name.starts_with("wren-"));
        assert_eq!(
            config.scheduling_mode,
            SchedulingMode::SharedPool { pool_size: num_cpus::get() }
        );
        assert_eq!(config.idle_wait, Duration::from_millis(10));
        assert_eq!(config.default_request_timeout, None);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(10));
        assert_eq!(config.diagnostics_capacity, 1024);
        assert_eq!(config.thread_name_prefix, "wren-worker-");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_names_are_unique() {
        assert_ne!(SystemConfig::default().name, SystemConfig::default().name);
    }

    #[test]
    fn test_builder_methods() {
        let config = SystemConfig::default()
            .with_name("test-system")
            .with_pool_size(2)
            .with_default_request_timeout(Some(Duration::from_millis(50)))
            .with_thread_name_prefix("t-");

        assert_eq!(config.name, "test-system");
        assert_eq!(config.scheduling_mode, SchedulingMode::SharedPool { pool_size: 2 });
        assert_eq!(config.default_request_timeout, Some(Duration::from_millis(50)));
        assert_eq!(config.thread_name_prefix, "t-");
        assert_eq!(SystemConfig::manual().scheduling_mode, SchedulingMode::Manual);
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let err = SystemConfig::default().with_pool_size(0).validate().unwrap_err();
        assert!(matches!(err, SystemError::ConfigError(_)));

        let err = SystemConfig::default()
            .with_diagnostics_capacity(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SystemError::ConfigError(_)));
    }
}
