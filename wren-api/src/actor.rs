//! # Actor Lifecycle Vocabulary
//!
//! The runtime-independent part of the actor lifecycle: the states an
//! actor moves through and the reasons it can leave them.

use std::fmt;

/// Actor lifecycle state.
///
/// Transitions only move forward:
/// `Starting -> Running -> Terminating -> Terminated`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorState {
    Starting = 0,
    Running = 1,
    Terminating = 2,
    Terminated = 3,
}

impl ActorState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`ActorState::as_u8`]; out-of-range values read as
    /// `Terminated`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ActorState::Starting,
            1 => ActorState::Running,
            2 => ActorState::Terminating,
            _ => ActorState::Terminated,
        }
    }

    /// Whether the actor still accepts envelopes.
    pub fn is_alive(self) -> bool {
        matches!(self, ActorState::Starting | ActorState::Running)
    }
}

/// Why an actor terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The actor stopped itself.
    Normal,
    /// Stopped on request of user code, typically via `stop`.
    UserShutdown,
    /// A handler panicked; the payload message is kept when it was a string.
    Panicked(String),
    /// The actor system shut down.
    SystemShutdown,
    /// The actor was unknown or already gone when it was observed.
    Unreachable,
    /// Application-defined reason.
    Custom(String),
}

impl ExitReason {
    /// Normal and user-requested exits are not failures.
    pub fn is_normal(&self) -> bool {
        matches!(self, ExitReason::Normal | ExitReason::UserShutdown)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Normal => f.write_str("normal"),
            ExitReason::UserShutdown => f.write_str("user shutdown"),
            ExitReason::Panicked(msg) => write!(f, "panicked: {msg}"),
            ExitReason::SystemShutdown => f.write_str("system shutdown"),
            ExitReason::Unreachable => f.write_str("unreachable"),
            ExitReason::Custom(msg) => f.write_str(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrips_through_u8() {
        for state in [
            ActorState::Starting,
            ActorState::Running,
            ActorState::Terminating,
            ActorState::Terminated,
        ] {
            assert_eq!(ActorState::from_u8(state.as_u8()), state);
        }
        assert!(ActorState::Running.is_alive());
        assert!(!ActorState::Terminating.is_alive());
    }

    #[test]
    fn test_exit_reason_display() {
        assert_eq!(ExitReason::UserShutdown.to_string(), "user shutdown");
        assert_eq!(ExitReason::Panicked("boom".into()).to_string(), "panicked: boom");
        assert!(ExitReason::Normal.is_normal());
        assert!(!ExitReason::SystemShutdown.is_normal());
    }
}
