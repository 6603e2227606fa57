//! Cyber Assistant terminal client
//!
//! Entry point: loads configuration, resolves the session id and hands stdin
//! to the terminal loop.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cyber_assistant::assistant::HttpAssistantClient;
use cyber_assistant::config::AppConfig;
use cyber_assistant::conversation::{ConversationController, ConversationStore};
use cyber_assistant::session::{SessionIdentity, storage_for_scope};
use cyber_assistant::terminal::{self, QUIT_COMMAND};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load()?;

    // Initialize tracing (M-LOG-STRUCTURED); stderr keeps the chat on stdout clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    let endpoint = config.assistant.endpoint_url()?;

    info!(
        name: "assistant.config.loaded",
        endpoint = %endpoint,
        scope = config.session.scope.as_str(),
        "Assistant configuration loaded"
    );

    let storage = storage_for_scope(config.session.scope, config.session.storage_path.clone());
    let session_id =
        SessionIdentity::new(storage, config.session.storage_key.as_str()).get_or_create_session_id();

    let controller = ConversationController::new(
        Arc::new(ConversationStore::new()),
        Arc::new(HttpAssistantClient::new(endpoint)),
        session_id.as_str(),
    );

    println!("Cyber Assistant");
    println!(
        "Hi! I'm your cybersecurity assistant. My session id is {session_id}. \
         Ask me about any information security topic. Type {QUIT_COMMAND} to exit."
    );

    terminal::run(controller, BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
