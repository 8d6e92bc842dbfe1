//! # Monitoring
//!
//! Supervision in wren is limited to notification: an observer that
//! monitors a subject receives exactly one [`DownNotification`] when the
//! subject terminates. Restart strategies are left to application code.

use crate::actor::ExitReason;
use crate::address::ActorId;

/// Delivered to every observer of a terminated actor, and to exit hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownNotification {
    pub subject: ActorId,
    pub reason: ExitReason,
}

impl DownNotification {
    pub fn new(subject: ActorId, reason: ExitReason) -> Self {
        Self { subject, reason }
    }
}
