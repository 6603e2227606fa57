//! reqwest-backed assistant client.

use tracing::{debug, warn};
use url::Url;

use super::{AssistantClient, AssistantError, TurnRequest, extract_reply};

/// Posts turns to a fixed webhook URL.
#[derive(Debug, Clone)]
pub struct HttpAssistantClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpAssistantClient {
    /// Create a client with a default reqwest client (platform timeouts).
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a client with a custom reqwest client.
    #[must_use]
    pub fn with_client(endpoint: Url, http: reqwest::Client) -> Self {
        Self { http, endpoint }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl AssistantClient for HttpAssistantClient {
    async fn send_turn(&self, session_id: &str, user_text: &str) -> Result<String, AssistantError> {
        let payload = TurnRequest {
            session_id,
            mensaje_usuario: user_text,
        };

        debug!(
            name: "assistant.turn.sent",
            endpoint = %self.endpoint,
            session_id = %session_id,
            "Sending turn"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                name: "assistant.turn.bad_status",
                status = status.as_u16(),
                "Assistant endpoint returned an error status"
            );
            return Err(AssistantError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let reply = extract_reply(&body);

        debug!(
            name: "assistant.turn.received",
            status = status.as_u16(),
            reply_len = reply.len(),
            "Turn reply received"
        );

        Ok(reply)
    }
}
