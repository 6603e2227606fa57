//! Observable conversation state.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::assistant::ErrorKind;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the user.
    User,
    /// Returned by the remote assistant.
    Assistant,
}

/// A single entry in the thread. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: Sender,
    text: String,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// User-facing description of a failed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

/// Snapshot of everything the UI renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Thread in display order.
    pub messages: Vec<Message>,
    /// True while a turn is in flight.
    pub pending: bool,
    /// Set when the last turn failed; cleared when the next one starts.
    pub last_error: Option<ErrorNotice>,
    /// Unsent input.
    pub draft: String,
}

/// Owner of [`ConversationState`].
///
/// Every mutation publishes a new snapshot to subscribers. Messages can only
/// be appended; nothing is removed or edited in place.
#[derive(Debug)]
pub struct ConversationStore {
    tx: watch::Sender<ConversationState>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create an empty store: no messages, not pending, no error.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ConversationState::default());
        Self { tx }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.tx.borrow().clone()
    }

    /// Receive a notification on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.tx.subscribe()
    }

    pub fn append_message(&self, sender: Sender, text: impl Into<String>) {
        let message = Message::new(sender, text);
        self.tx.send_modify(|state| state.messages.push(message));
    }

    pub fn set_pending(&self, pending: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.pending != pending;
            state.pending = pending;
            changed
        });
    }

    pub fn set_error(&self, error: Option<ErrorNotice>) {
        self.tx.send_if_modified(|state| {
            let changed = state.last_error != error;
            state.last_error = error;
            changed
        });
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.tx.send_if_modified(|state| {
            let changed = state.draft != draft;
            state.draft = draft;
            changed
        });
    }

    /// Atomically start a turn unless one is already in flight.
    ///
    /// On success the user message is appended, the error cleared, the draft
    /// emptied and `pending` set, all in one published snapshot.
    pub(crate) fn try_begin_turn(&self, user_text: &str) -> bool {
        self.tx.send_if_modified(|state| {
            if state.pending {
                return false;
            }
            state.messages.push(Message::new(Sender::User, user_text));
            state.last_error = None;
            state.draft.clear();
            state.pending = true;
            true
        })
    }
}
