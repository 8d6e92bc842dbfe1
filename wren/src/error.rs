use thiserror::Error;

pub use wren_api::errors::{ActorError, ErrorKind};

/// Errors related to spawning actors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// The initial behavior does not handle every message of the interface.
    #[error("Behavior of {actor} does not cover messages: {}", .missing.join(", "))]
    IncompleteBehavior {
        actor: String,
        missing: Vec<&'static str>,
    },
    /// The constructor passed to `spawn_with` panicked.
    #[error("Constructor of {actor} panicked: {reason}")]
    ConstructorPanicked { actor: String, reason: String },
    #[error("System is shutting down")]
    SystemShutdown,
}

impl From<SpawnError> for ActorError {
    fn from(err: SpawnError) -> Self {
        match err {
            SpawnError::IncompleteBehavior { missing, .. } => ActorError::IncompleteBehavior { missing },
            SpawnError::SystemShutdown => ActorError::SchedulerShuttingDown,
            other => ActorError::Other(anyhow::Error::new(other)),
        }
    }
}

/// Errors related to the Actor System itself.
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Thread setup error: {0}")]
    ThreadSetupError(String),
    #[error("Actor system is already shutting down")]
    ShuttingDown,
    #[error("Failed during shutdown: {0}")]
    ShutdownError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Operation timed out: {0}")]
    Timeout(String),
    #[error("Internal system error: {0}")]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = SpawnError::IncompleteBehavior {
            actor: "adder".into(),
            missing: vec!["Add", "Sub"],
        };
        assert_eq!(err.to_string(), "Behavior of adder does not cover messages: Add, Sub");
        assert_eq!(SpawnError::SystemShutdown.to_string(), "System is shutting down");
    }

    #[test]
    fn test_spawn_error_converts_to_actor_error() {
        let err: ActorError = SpawnError::SystemShutdown.into();
        assert_eq!(err.kind(), ErrorKind::SchedulerShuttingDown);

        let err: ActorError = SpawnError::ConstructorPanicked {
            actor: "worker".into(),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_system_error_display() {
        assert_eq!(
            SystemError::Timeout("graceful drain".into()).to_string(),
            "Operation timed out: graceful drain"
        );
        let err: SystemError = anyhow::anyhow!("worker join failed").into();
        assert_eq!(err.to_string(), "Internal system error: worker join failed");
    }
}
