//! Remote assistant endpoint.
//!
//! One call per user turn: the user's text and the session id go out, the
//! assistant's reply text comes back. Every failure collapses to
//! [`ErrorKind::NetworkFailure`] at the controller boundary; the detailed
//! [`AssistantError`] is only kept for logging.
//!
//! # Wire format
//!
//! Request body:
//!
//! ```json
//! { "session_id": "sess-1700000000000-k3j9x2a", "mensaje_usuario": "What is phishing?" }
//! ```
//!
//! Response body (2xx):
//!
//! ```json
//! { "respuesta_asistente": "Phishing is..." }
//! ```

mod http;

pub use http::HttpAssistantClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply used when a successful response carries no usable reply text.
pub const FALLBACK_REPLY: &str = "The assistant did not provide a valid response.";

/// Error category visible to the conversation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure or non-success status.
    NetworkFailure,
}

/// Why a turn failed.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// DNS, connect, TLS, aborted request or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

impl AssistantError {
    /// Category used for user-facing decisions.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Status { .. } => ErrorKind::NetworkFailure,
        }
    }
}

/// Outbound request payload.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest<'a> {
    pub session_id: &'a str,
    pub mensaje_usuario: &'a str,
}

/// Performs the single external call of a turn.
#[async_trait::async_trait]
pub trait AssistantClient: Send + Sync + std::fmt::Debug {
    /// Send one user message and return the assistant's reply text.
    ///
    /// Makes exactly one attempt. Never mutates conversation state.
    async fn send_turn(&self, session_id: &str, user_text: &str) -> Result<String, AssistantError>;
}

/// Pull the reply text out of a 2xx response body.
///
/// A non-empty string is used as is; a non-zero number or `true` is rendered
/// as text. Bodies that are not JSON, lack the field, or carry an empty,
/// zero, `false`, `null` or structured value yield [`FALLBACK_REPLY`].
#[must_use]
pub fn extract_reply(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("respuesta_asistente").and_then(reply_text))
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}

fn reply_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
