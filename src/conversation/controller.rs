//! Turn lifecycle: `Idle -> Sending -> Idle`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::store::{ConversationState, ConversationStore, ErrorNotice, Sender};
use crate::assistant::AssistantClient;

/// Notice shown when a turn fails, whatever the cause.
pub const ERROR_NOTICE: &str =
    "Error: could not get a response from the assistant. Check the API endpoint.";

/// Controller state, derived from the store's `pending` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Sending,
}

/// Why a submission was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty after trimming.
    EmptyInput,
    /// Another turn is still in flight.
    TurnInFlight,
}

/// Result of [`ConversationController::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing changed and no call was made.
    Rejected(RejectReason),
    /// The assistant's reply was appended.
    Replied,
    /// The call failed; `last_error` is set and the user message kept.
    Failed,
}

/// A started (or rejected) turn; resolves once the assistant call ends.
pub type TurnFuture = Pin<Box<dyn Future<Output = SubmitOutcome> + Send>>;

/// Drives user input through the assistant client into the store.
///
/// Cloning is cheap and clones share the same store, so a UI can hand a
/// clone to each submission task. At most one turn is in flight across all
/// clones.
#[derive(Debug, Clone)]
pub struct ConversationController {
    store: Arc<ConversationStore>,
    client: Arc<dyn AssistantClient>,
    session_id: Arc<str>,
}

impl ConversationController {
    #[must_use]
    pub fn new(
        store: Arc<ConversationStore>,
        client: Arc<dyn AssistantClient>,
        session_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            client,
            session_id: session_id.into(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        if self.store.snapshot().pending {
            ControllerState::Sending
        } else {
            ControllerState::Idle
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.store.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.store.subscribe()
    }

    /// Replace the unsent input.
    pub fn update_draft(&self, text: impl Into<String>) {
        self.store.set_draft(text);
    }

    /// Submit whatever is currently in the draft.
    ///
    /// The draft is read and the turn started before this returns, so a
    /// following [`update_draft`](Self::update_draft) cannot race it.
    pub fn submit_draft(&self) -> TurnFuture {
        let draft = self.store.snapshot().draft;
        self.submit(&draft)
    }

    /// Run one turn.
    ///
    /// Whitespace-only input, or input arriving while a turn is in flight,
    /// is a no-op. Otherwise the trimmed text is appended as a user message
    /// and the draft cleared before this returns; the returned future makes
    /// the remote call. Dropping the future abandons the call and returns the
    /// controller to `Idle`, keeping the user message.
    pub fn submit(&self, text: &str) -> TurnFuture {
        let text = text.trim().to_string();
        let started = if text.is_empty() {
            Err(RejectReason::EmptyInput)
        } else if self.store.try_begin_turn(&text) {
            Ok(InFlight {
                store: Arc::clone(&self.store),
                done: false,
            })
        } else {
            Err(RejectReason::TurnInFlight)
        };

        let this = self.clone();
        Box::pin(async move {
            match started {
                Ok(flight) => this.run_turn(flight, &text).await,
                Err(reason) => SubmitOutcome::Rejected(reason),
            }
        })
    }

    async fn run_turn(&self, mut flight: InFlight, text: &str) -> SubmitOutcome {
        let outcome = match self.client.send_turn(&self.session_id, text).await {
            Ok(reply) => {
                self.store.append_message(Sender::Assistant, reply);
                info!(name: "conversation.turn.completed", session_id = %self.session_id, "Turn completed");
                SubmitOutcome::Replied
            }
            Err(e) => {
                warn!(
                    name: "conversation.turn.failed",
                    session_id = %self.session_id,
                    error = %e,
                    "Failed to reach the assistant"
                );
                self.store.set_error(Some(ErrorNotice {
                    kind: e.kind(),
                    message: ERROR_NOTICE.to_string(),
                }));
                SubmitOutcome::Failed
            }
        };
        flight.finish();
        outcome
    }
}

/// Owns the `pending` flag for one turn and clears it however the turn ends.
#[derive(Debug)]
struct InFlight {
    store: Arc<ConversationStore>,
    done: bool,
}

impl InFlight {
    fn finish(&mut self) {
        self.store.set_pending(false);
        self.done = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            warn!(name: "conversation.turn.abandoned", "Turn dropped before the assistant replied");
            self.store.set_pending(false);
        }
    }
}
