//! Line-oriented chat surface.
//!
//! Every input line becomes the draft and is submitted; the thread is
//! printed as the conversation changes. On EOF or [`QUIT_COMMAND`] the loop
//! waits for any turn still in flight so its reply is shown before exit.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinSet;

use crate::conversation::{
    ConversationController, ConversationState, ErrorNotice, RejectReason, Sender, SubmitOutcome,
};

pub const QUIT_COMMAND: &str = "/quit";

const BUSY_NOTICE: &str = "(still waiting for the previous reply; send your message again afterwards)";

/// Read lines from `input` until EOF or `/quit`, then drain in-flight turns.
pub async fn run<R>(controller: ConversationController, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (stop_tx, stop_rx) = oneshot::channel();
    let renderer = tokio::spawn(render(controller.subscribe(), stop_rx));
    let mut turns = JoinSet::new();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            break;
        }

        controller.update_draft(line);
        let turn = controller.submit_draft();
        turns.spawn(async move {
            if let SubmitOutcome::Rejected(RejectReason::TurnInFlight) = turn.await {
                println!("{BUSY_NOTICE}");
            }
        });
    }

    while turns.join_next().await.is_some() {}

    let _ = stop_tx.send(());
    renderer.await.map_err(std::io::Error::other)
}

async fn render(mut rx: watch::Receiver<ConversationState>, mut stop: oneshot::Receiver<()>) {
    let mut view = ThreadView::default();
    loop {
        print_lines(view.draw(&rx.borrow_and_update()));
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut stop => {
                print_lines(view.draw(&rx.borrow_and_update()));
                break;
            }
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// Tracks what has been printed so each snapshot only adds new output.
#[derive(Debug, Default)]
struct ThreadView {
    shown: usize,
    was_pending: bool,
    shown_error: Option<ErrorNotice>,
}

impl ThreadView {
    fn draw(&mut self, state: &ConversationState) -> Vec<String> {
        let mut out = Vec::new();

        for message in state.messages.iter().skip(self.shown) {
            let who = match message.sender() {
                Sender::User => "you",
                Sender::Assistant => "assistant",
            };
            out.push(format!("{who}> {}", message.text()));
        }
        self.shown = state.messages.len();

        if state.pending && !self.was_pending {
            out.push("assistant is thinking...".to_string());
        }
        self.was_pending = state.pending;

        if state.last_error != self.shown_error {
            if let Some(notice) = &state.last_error {
                out.push(notice.message.clone());
            }
            self.shown_error.clone_from(&state.last_error);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantClient, AssistantError};
    use crate::conversation::ConversationStore;
    use std::sync::Arc;
    use std::time::Duration;

    /// Replies after a delay, long enough to still be in flight at EOF.
    #[derive(Debug)]
    struct SlowClient;

    #[async_trait::async_trait]
    impl AssistantClient for SlowClient {
        async fn send_turn(&self, _session_id: &str, user_text: &str) -> Result<String, AssistantError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(format!("re: {user_text}"))
        }
    }

    fn setup() -> (Arc<ConversationStore>, ConversationController) {
        let store = Arc::new(ConversationStore::new());
        let ctl = ConversationController::new(Arc::clone(&store), Arc::new(SlowClient), "sess-1-term");
        (store, ctl)
    }

    #[tokio::test]
    async fn test_eof_waits_for_in_flight_turn() {
        let (store, ctl) = setup();

        run(ctl, &b"What is phishing?\n"[..]).await.unwrap();

        let state = store.snapshot();
        let texts: Vec<&str> = state.messages.iter().map(|m| m.text()).collect();
        assert_eq!(texts, ["What is phishing?", "re: What is phishing?"]);
        assert!(!state.pending);
        assert!(state.draft.is_empty());
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (store, ctl) = setup();

        run(ctl, &b"hello\n/quit\nignored\n"[..]).await.unwrap();

        let texts: Vec<String> = store
            .snapshot()
            .messages
            .iter()
            .map(|m| m.text().to_string())
            .collect();
        assert_eq!(texts, ["hello", "re: hello"]);
    }

    #[tokio::test]
    async fn test_line_during_flight_is_rejected_and_kept_as_draft() {
        let (store, ctl) = setup();

        run(ctl, &b"first\nsecond\n"[..]).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].text(), "first");
        assert_eq!(state.draft, "second");
    }

    #[test]
    fn test_view_prints_only_new_output() {
        let store = ConversationStore::new();
        let mut view = ThreadView::default();

        store.append_message(Sender::User, "hi");
        store.set_pending(true);
        assert_eq!(
            view.draw(&store.snapshot()),
            ["you> hi", "assistant is thinking..."]
        );

        store.append_message(Sender::Assistant, "hello");
        store.set_pending(false);
        assert_eq!(view.draw(&store.snapshot()), ["assistant> hello"]);
        assert!(view.draw(&store.snapshot()).is_empty());
    }
}
