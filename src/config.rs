use crate::session::{DEFAULT_SESSION_KEY, StorageScope};
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Default assistant webhook (a local n8n instance).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5678/webhook/cyber-assistant";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Assistant webhook URL
    #[arg(long, env = "ASSISTANT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Where the session id lives: `tab` (this run only) or `persistent`
    #[arg(long, value_enum, env = "SESSION_SCOPE")]
    pub session_scope: Option<StorageScope>,

    /// Storage file for the persistent scope
    #[arg(long, env = "SESSION_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub scope: StorageScope,
    pub storage_path: Option<PathBuf>,
    pub storage_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > CLI env var > `CYBER_ASSISTANT_*` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("assistant.endpoint", DEFAULT_ENDPOINT)?
            .set_default("session.scope", StorageScope::Tab.as_str())?
            .set_default("session.storage_key", DEFAULT_SESSION_KEY)?
            .set_default("logging.filter", "warn")?;

        // Explicit file must exist; ./config.{yaml,toml,json} is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. CYBER_ASSISTANT_SESSION__SCOPE=persistent
        builder = builder.add_source(
            Environment::with_prefix("CYBER_ASSISTANT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(endpoint) = cli.endpoint {
            builder = builder.set_override("assistant.endpoint", endpoint)?;
        }
        if let Some(scope) = cli.session_scope {
            builder = builder.set_override("session.scope", scope.as_str())?;
        }
        if let Some(path) = cli.storage_path {
            builder =
                builder.set_override("session.storage_path", path.to_string_lossy().into_owned())?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.assistant.endpoint_url()?;
        Ok(cfg)
    }
}

impl AssistantConfig {
    /// Parse the endpoint, accepting only absolute http(s) URLs.
    pub fn endpoint_url(&self) -> Result<Url, config::ConfigError> {
        let url = Url::parse(self.endpoint.trim()).map_err(|e| {
            config::ConfigError::Message(format!(
                "invalid assistant.endpoint {:?}: {e}",
                self.endpoint
            ))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(config::ConfigError::Message(format!(
                "assistant.endpoint must use http or https, got {other}"
            ))),
        }
    }
}
