//! Telegram Bot API gateway -- long-poll `getUpdates` plus `sendMessage`.
//!
//! [`BotApi`] is the production client over `reqwest`. The [`Gateway`] trait
//! seams it off so the subscription loop and the notifier can be exercised
//! against an in-memory gateway in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::telegram::types::ApiResponse;

pub mod commands;
pub mod types;

/// Base URL for the Telegram Bot API.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Update categories the bot consumes. `chat_member` updates are only
/// delivered when explicitly listed in `allowed_updates`.
const ALLOWED_UPDATES: [&str; 2] = ["message", "chat_member"];

/// Extra seconds added to the HTTP timeout beyond the long-poll timeout,
/// so the TCP socket stays open while Telegram holds the request.
const POLL_TIMEOUT_MARGIN_SECS: u64 = 10;

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The Telegram API returned an error response.
    #[error("Telegram API error: {description}")]
    Api {
        /// Numeric error code reported by the API, when present.
        code: Option<i64>,
        /// Human-readable description from the API.
        description: String,
    },
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON deserialization failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this error means the bot token was rejected.
    ///
    /// 401 is an invalid token; 404 is what the API answers for a token with
    /// a malformed bot-id prefix. Neither recovers by retrying.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            Self::Api {
                code: Some(401) | Some(404),
                ..
            }
        )
    }
}

/// Telegram operations the rest of the bot depends on.
///
/// `get_updates` yields raw JSON values rather than parsed [`types::Update`]s
/// so one malformed update can be skipped without failing its whole batch.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Long-poll for the next batch of updates at or after `offset`.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<serde_json::Value>, GatewayError>;

    /// Send a plain text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), GatewayError>;

    /// Drop all queued updates and return the offset just past the newest
    /// one, or `None` when the queue was already empty.
    async fn discard_backlog(&self) -> Result<Option<i64>, GatewayError> {
        let queued = self.get_updates(Some(-1), 0).await?;
        Ok(queued
            .last()
            .and_then(|raw| raw.get("update_id"))
            .and_then(serde_json::Value::as_i64)
            .map(|id| id.saturating_add(1)))
    }
}

/// Production Telegram Bot API client.
pub struct BotApi {
    client: reqwest::Client,
    token: String,
}

impl BotApi {
    /// Create a client for the given bot token.
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.to_owned(),
        }
    }

    /// Call one Bot API method and unwrap the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, GatewayError> {
        let url = format!("{TELEGRAM_API_BASE}/bot{}/{method}", self.token);

        let mut request = self.client.post(&url).json(&body);
        if let Some(t) = timeout {
            request = request.timeout(t);
        }

        let response: ApiResponse<T> = request.send().await?.json().await?;

        if !response.ok {
            return Err(GatewayError::Api {
                code: response.error_code,
                description: response
                    .description
                    .unwrap_or_else(|| "unknown error".to_owned()),
            });
        }

        response.result.ok_or_else(|| GatewayError::Api {
            code: None,
            description: format!("{method}: missing result"),
        })
    }
}

#[async_trait]
impl Gateway for BotApi {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<serde_json::Value>, GatewayError> {
        let mut body = serde_json::json!({
            "timeout": timeout_secs,
            "allowed_updates": ALLOWED_UPDATES,
        });
        if let Some(off) = offset {
            body["offset"] = serde_json::Value::from(off);
        }

        let http_timeout =
            Duration::from_secs(u64::from(timeout_secs).saturating_add(POLL_TIMEOUT_MARGIN_SECS));

        self.call("getUpdates", body, Some(http_timeout)).await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), GatewayError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let _: serde_json::Value = self.call("sendMessage", body, None).await?;
        debug!(chat_id, "sent Telegram message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: Option<i64>) -> GatewayError {
        GatewayError::Api {
            code,
            description: "test".to_owned(),
        }
    }

    #[test]
    fn unauthorized_is_credential_rejection() {
        assert!(api_error(Some(401)).is_credential_rejection());
        assert!(api_error(Some(404)).is_credential_rejection());
    }

    #[test]
    fn server_errors_are_not_credential_rejections() {
        assert!(!api_error(Some(500)).is_credential_rejection());
        assert!(!api_error(Some(429)).is_credential_rejection());
        assert!(!api_error(None).is_credential_rejection());
    }

    #[test]
    fn parse_error_is_not_credential_rejection() {
        let err: GatewayError = serde_json::from_str::<serde_json::Value>("not json")
            .expect_err("should fail")
            .into();
        assert!(!err.is_credential_rejection());
    }

    #[tokio::test]
    async fn discard_backlog_reports_offset_past_newest() {
        struct Queued;

        #[async_trait]
        impl Gateway for Queued {
            async fn get_updates(
                &self,
                offset: Option<i64>,
                timeout_secs: u32,
            ) -> Result<Vec<serde_json::Value>, GatewayError> {
                assert_eq!(offset, Some(-1));
                assert_eq!(timeout_secs, 0);
                Ok(vec![
                    serde_json::json!({"update_id": 10}),
                    serde_json::json!({"update_id": 12}),
                ])
            }

            async fn send_message(&self, _: i64, _: &str) -> Result<(), GatewayError> {
                Ok(())
            }
        }

        let next = Queued.discard_backlog().await.expect("discard should work");
        assert_eq!(next, Some(13));
    }

    #[tokio::test]
    async fn discard_backlog_empty_queue() {
        struct Empty;

        #[async_trait]
        impl Gateway for Empty {
            async fn get_updates(
                &self,
                _: Option<i64>,
                _: u32,
            ) -> Result<Vec<serde_json::Value>, GatewayError> {
                Ok(vec![])
            }

            async fn send_message(&self, _: i64, _: &str) -> Result<(), GatewayError> {
                Ok(())
            }
        }

        let next = Empty.discard_backlog().await.expect("discard should work");
        assert_eq!(next, None);
    }
}
