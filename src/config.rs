//! Configuration loading.
//!
//! All settings come from environment variables (a `.env` file is honored by
//! the binary before loading). The bot token is the only required value;
//! everything else has a default. CLI flags may override individual fields
//! after loading.

use thiserror::Error;

/// Default `getUpdates` long-poll timeout, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bot token environment variable is unset or empty.
    #[error("NAMEWATCH_BOT_TOKEN is not set")]
    MissingToken,
}

/// Runtime configuration for the bot process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub bot_token: String,
    /// Discard updates queued while the bot was offline, so only future
    /// changes are announced.
    pub drop_pending_updates: bool,
    /// Long-poll timeout for `getUpdates`, in seconds.
    pub poll_timeout_secs: u32,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when `NAMEWATCH_BOT_TOKEN` is
    /// unset or blank.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom env resolver (for testing).
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = env("NAMEWATCH_BOT_TOKEN")
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let drop_pending_updates = !env_flag(env("NAMEWATCH_KEEP_BACKLOG"));

        let poll_timeout_secs = match env("NAMEWATCH_POLL_TIMEOUT_SECS") {
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        var = "NAMEWATCH_POLL_TIMEOUT_SECS",
                        value = %v,
                        "ignoring invalid env override"
                    );
                    DEFAULT_POLL_TIMEOUT_SECS
                }
            },
            None => DEFAULT_POLL_TIMEOUT_SECS,
        };

        let log_filter = env("NAMEWATCH_LOG").unwrap_or_else(|| "info".to_owned());

        Ok(Self {
            bot_token,
            drop_pending_updates,
            poll_timeout_secs,
            log_filter,
        })
    }
}

/// Interpret an env value as a boolean flag.
fn env_flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(str::trim),
        Some("1") | Some("true") | Some("yes")
    )
}
