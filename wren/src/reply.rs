use std::any::type_name;
use std::fmt;
use std::sync::Weak;

use tracing::trace;
use wren_api::errors::ActorError;
use wren_api::types::{ActorResult, BoxedMessage};
use wren_api::{ActorId, CorrelationId};

use crate::promise::Promise;
use crate::system::SystemInner;

type ExternalSink = Box<dyn FnOnce(ActorResult<BoxedMessage>) + Send>;

enum Route {
    /// Response re-enters the requesting actor through its mailbox.
    Actor {
        system: Weak<SystemInner>,
        requester: ActorId,
    },
    /// Response resolves a future held outside the runtime.
    External(ExternalSink),
}

/// Where the answer to a request goes. Used exactly once.
///
/// Dropping an unused route answers the requester with `PromiseOrphaned`,
/// so a request is never left without a response.
pub(crate) struct ReplyTo {
    correlation: CorrelationId,
    route: Option<Route>,
}

impl ReplyTo {
    pub(crate) fn actor(system: Weak<SystemInner>, requester: ActorId, correlation: CorrelationId) -> Self {
        Self {
            correlation,
            route: Some(Route::Actor { system, requester }),
        }
    }

    /// Route into a typed promise; the boxed payload is downcast on delivery.
    pub(crate) fn external<T: Send + 'static>(promise: Promise<T>) -> Self {
        let sink = move |result: ActorResult<BoxedMessage>| {
            let outcome = match result {
                Ok(payload) => match payload.downcast::<T>() {
                    Ok(value) => promise.deliver(*value),
                    Err(_) => promise.fail(ActorError::ReplyTypeMismatch {
                        expected: type_name::<T>(),
                    }),
                },
                Err(err) => promise.fail(err),
            };
            if let Err(err) = outcome {
                // Usually a late answer after the deadline already fired.
                trace!(error = %err, "dropping late response");
            }
        };
        Self {
            correlation: CorrelationId::next(),
            route: Some(Route::External(Box::new(sink))),
        }
    }

    pub(crate) fn correlation(&self) -> Option<CorrelationId> {
        Some(self.correlation)
    }

    pub(crate) fn respond(mut self, responder: Option<ActorId>, result: ActorResult<BoxedMessage>) {
        if let Some(route) = self.route.take() {
            Self::dispatch(route, self.correlation, responder, result);
        }
    }

    fn dispatch(
        route: Route,
        correlation: CorrelationId,
        responder: Option<ActorId>,
        result: ActorResult<BoxedMessage>,
    ) {
        match route {
            Route::Actor { system, requester } => {
                if let Some(system) = system.upgrade() {
                    system.deliver_response(requester, responder, correlation, result);
                }
            }
            Route::External(sink) => sink(result),
        }
    }
}

impl Drop for ReplyTo {
    fn drop(&mut self) {
        if let Some(route) = self.route.take() {
            Self::dispatch(
                route,
                self.correlation,
                None,
                Err(ActorError::PromiseOrphaned { owner: None }),
            );
        }
    }
}

impl fmt::Debug for ReplyTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = match &self.route {
            Some(Route::Actor { requester, .. }) => format!("actor {}", requester),
            Some(Route::External(_)) => "external".to_string(),
            None => "used".to_string(),
        };
        f.debug_struct("ReplyTo")
            .field("correlation", &self.correlation)
            .field("route", &route)
            .finish()
    }
}
