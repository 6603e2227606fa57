//! Conversation state and the turn controller.
//!
//! - [`ConversationStore`]: append-only thread plus `pending`/`last_error`
//!   flags, published to subscribers as snapshots
//! - [`ConversationController`]: validates input, runs one turn at a time
//!   against an [`AssistantClient`](crate::assistant::AssistantClient)

mod controller;
mod store;

pub use controller::{
    ConversationController, ControllerState, ERROR_NOTICE, RejectReason, SubmitOutcome, TurnFuture,
};
pub use store::{ConversationState, ConversationStore, ErrorNotice, Message, Sender};
