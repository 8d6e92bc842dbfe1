use std::fmt;

use wren_api::types::{ActorResult, BoxedMessage};
use wren_api::{ActorId, CorrelationId, DownNotification, ExitReason, Message, Shape};

use crate::reply::ReplyTo;

/// What an envelope carries, known without looking at the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadTag {
    /// A user message of the given shape.
    Message(Shape),
    /// The answer to an earlier request.
    Response,
    /// A monitored actor terminated.
    Down,
    /// Stop command.
    Exit,
}

impl PayloadTag {
    /// Down and exit envelopes travel on the mailbox's system lane.
    pub fn is_control(&self) -> bool {
        matches!(self, PayloadTag::Down | PayloadTag::Exit)
    }
}

pub(crate) enum Body {
    Message(BoxedMessage),
    Response(ActorResult<BoxedMessage>),
    Down(DownNotification),
    Exit(ExitReason),
}

/// Unit of delivery between actors. Immutable once enqueued.
pub(crate) struct Envelope {
    pub(crate) sender: Option<ActorId>,
    pub(crate) tag: PayloadTag,
    pub(crate) body: Body,
    pub(crate) correlation: Option<CorrelationId>,
    pub(crate) reply_to: Option<ReplyTo>,
}

impl Envelope {
    pub(crate) fn message<M: Message>(sender: Option<ActorId>, msg: M, reply_to: Option<ReplyTo>) -> Self {
        Self {
            sender,
            tag: PayloadTag::Message(Shape::of::<M>()),
            body: Body::Message(Box::new(msg)),
            correlation: reply_to.as_ref().and_then(ReplyTo::correlation),
            reply_to,
        }
    }

    pub(crate) fn response(
        sender: Option<ActorId>,
        correlation: CorrelationId,
        result: ActorResult<BoxedMessage>,
    ) -> Self {
        Self {
            sender,
            tag: PayloadTag::Response,
            body: Body::Response(result),
            correlation: Some(correlation),
            reply_to: None,
        }
    }

    pub(crate) fn down(note: DownNotification) -> Self {
        Self {
            sender: Some(note.subject),
            tag: PayloadTag::Down,
            body: Body::Down(note),
            correlation: None,
            reply_to: None,
        }
    }

    pub(crate) fn exit(sender: Option<ActorId>, reason: ExitReason) -> Self {
        Self {
            sender,
            tag: PayloadTag::Exit,
            body: Body::Exit(reason),
            correlation: None,
            reply_to: None,
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("sender", &self.sender)
            .field("tag", &self.tag)
            .field("correlation", &self.correlation)
            .field("reply_to", &self.reply_to.is_some())
            .finish()
    }
}
