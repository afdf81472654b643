//! Long-poll subscription loop.
//!
//! Feeds updates to the notifier one at a time, in arrival order. Per-update
//! failures (malformed payload, handler error) are reported and skipped;
//! transport-level failures return to the caller, which owns retry policy.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::telegram::types::Update;
use crate::telegram::{Gateway, GatewayError};
use crate::watcher::NameChangeNotifier;

/// Long-poll subscription over a [`Gateway`].
///
/// The `getUpdates` offset lives on the struct so it survives across `run`
/// calls when the supervisor restarts a failed subscription.
pub struct UpdateSubscriber {
    gateway: Arc<dyn Gateway>,
    poll_timeout_secs: u32,
    offset: Option<i64>,
    discard_backlog: bool,
}

impl UpdateSubscriber {
    /// Create a subscriber.
    ///
    /// When `discard_backlog` is set, updates queued before the first `run`
    /// are dropped, so only future changes are announced.
    pub fn new(gateway: Arc<dyn Gateway>, poll_timeout_secs: u32, discard_backlog: bool) -> Self {
        Self {
            gateway,
            poll_timeout_secs,
            offset: None,
            discard_backlog,
        }
    }

    /// Poll for updates until shut down or a transport failure.
    ///
    /// The shutdown signal interrupts only the blocking long-poll wait; an
    /// in-flight handler invocation always runs to completion.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`GatewayError`] when `getUpdates` fails. The
    /// caller decides whether to restart.
    pub async fn run(
        &mut self,
        notifier: &NameChangeNotifier,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        if self.discard_backlog {
            if let Some(next) = self.gateway.discard_backlog().await? {
                info!(offset = next, "discarded queued updates");
                self.offset = Some(next);
            }
            self.discard_backlog = false;
        }

        info!("subscribed to member updates");

        loop {
            if *shutdown.borrow() {
                info!("subscription stopping");
                return Ok(());
            }

            let batch = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender gone: the process is tearing down.
                        return Ok(());
                    }
                    continue;
                }
                batch = self.gateway.get_updates(self.offset, self.poll_timeout_secs) => batch?,
            };

            for raw in batch {
                // update_id is always present in practice; without it there
                // is nothing to advance the offset past.
                let next_offset = raw
                    .get("update_id")
                    .and_then(serde_json::Value::as_i64)
                    .map(|id| id.saturating_add(1));

                match serde_json::from_value::<Update>(raw) {
                    Ok(update) => {
                        if let Err(e) = notifier.handle_update(&update).await {
                            warn!(update_id = update.update_id, error = %e, "handler error, continuing");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "skipping malformed update");
                    }
                }

                self.offset = next_offset.or(self.offset);
            }
        }
    }
}
