//! Diagnostics channel.
//!
//! Errors that have no waiting future (a failed one-way send, a response
//! whose requester is gone, a handler panic) are logged and recorded here.
//! The channel is bounded; when it is full the newest record is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use flume::{Receiver, Sender, TrySendError};
use tracing::warn;
use wren_api::errors::ActorError;
use wren_api::ActorId;

/// One recorded error.
#[derive(Debug)]
pub struct Diagnostic {
    /// Actor the error is attributed to, if any.
    pub actor: Option<ActorId>,
    pub error: ActorError,
    /// Where the error surfaced.
    pub context: String,
}

impl Diagnostic {
    pub fn new(actor: Option<ActorId>, error: ActorError, context: impl Into<String>) -> Self {
        Self {
            actor,
            error,
            context: context.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actor {
            Some(actor) => write!(f, "[{}] {}: {}", actor, self.context, self.error),
            None => write!(f, "{}: {}", self.context, self.error),
        }
    }
}

pub(crate) struct DiagnosticsSink {
    sender: Sender<Diagnostic>,
    receiver: Receiver<Diagnostic>,
    dropped: AtomicU64,
}

impl DiagnosticsSink {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: AtomicU64::new(0),
        }
    }

    pub(crate) fn record(&self, diagnostic: Diagnostic) {
        warn!(
            actor = ?diagnostic.actor,
            context = %diagnostic.context,
            error = %diagnostic.error,
            "diagnostic recorded"
        );
        match self.sender.try_send(diagnostic) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn receiver(&self) -> Receiver<Diagnostic> {
        self.receiver.clone()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for DiagnosticsSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticsSink")
            .field("queued", &self.sender.len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_until_full_then_drops_newest() {
        let sink = DiagnosticsSink::new(2);
        let actor = ActorId::next();
        sink.record(Diagnostic::new(Some(actor), ActorError::handling("first"), "test"));
        sink.record(Diagnostic::new(None, ActorError::handling("second"), "test"));
        sink.record(Diagnostic::new(None, ActorError::handling("third"), "test"));

        assert_eq!(sink.dropped(), 1);
        let receiver = sink.receiver();
        let kept: Vec<String> = receiver.try_iter().map(|d| d.error.to_string()).collect();
        assert_eq!(
            kept,
            vec![
                "Message handling failed: first".to_string(),
                "Message handling failed: second".to_string()
            ]
        );
    }

    #[test]
    fn test_display_includes_actor() {
        let actor = ActorId::next();
        let diagnostic = Diagnostic::new(Some(actor), ActorError::ActorNotFound(actor), "send");
        assert_eq!(
            diagnostic.to_string(),
            format!("[{}] send: Actor not found: {}", actor, actor)
        );
    }
}
