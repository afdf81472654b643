//! Name-change detection and notification dispatch.
//!
//! One [`NameChangeNotifier::handle_update`] call per incoming update.
//! Purely stateless: every decision is made from the old/new member
//! snapshots inside a single update, never across updates.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::telegram::types::{ChatMemberUpdated, Update, User};
use crate::telegram::{commands, Gateway, GatewayError};

/// Handler errors. All of them are contained at the event boundary by the
/// subscription loop; none abort the subscription.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The outbound `sendMessage` call failed. The notification is dropped;
    /// there is no retry.
    #[error("failed to send message to chat {chat_id}: {source}")]
    Dispatch {
        /// Destination chat.
        chat_id: i64,
        /// Underlying gateway failure.
        #[source]
        source: GatewayError,
    },
}

/// What a handler invocation did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// A name change was detected and announced.
    NameChange,
    /// A slash command was answered.
    Command,
    /// Nothing to do for this update.
    Ignored,
}

/// Compute a user's display name: first and last name joined by a single
/// space, missing parts treated as empty, then trimmed.
pub fn display_name(user: &User) -> String {
    let first = user.first_name.as_deref().unwrap_or("");
    let last = user.last_name.as_deref().unwrap_or("");
    format!("{first} {last}").trim().to_owned()
}

/// Body of the announcement posted into the chat.
fn notification_text(old_name: &str, new_name: &str) -> String {
    format!("A group member changed their name\nOld name: {old_name}\nNew name: {new_name}")
}

/// Detects display-name changes in member updates and announces them in the
/// chat they happened in.
pub struct NameChangeNotifier {
    gateway: Arc<dyn Gateway>,
}

impl NameChangeNotifier {
    /// Create a notifier that sends through the given gateway.
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Process one update.
    ///
    /// Member updates are checked for a display-name change; `/start` and
    /// `/help` messages get a greeting; everything else is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Dispatch`] when an outbound send fails.
    pub async fn handle_update(&self, update: &Update) -> Result<Handled, WatchError> {
        if let Some(member_update) = &update.chat_member {
            return self.handle_member_update(member_update).await;
        }

        if let Some(message) = &update.message {
            if let Some(text) = &message.text {
                if commands::parse(text).is_some() {
                    self.send(message.chat.id, &commands::greeting()).await?;
                    return Ok(Handled::Command);
                }
            }
        }

        Ok(Handled::Ignored)
    }

    /// Compare old/new display names and announce a change.
    async fn handle_member_update(
        &self,
        member_update: &ChatMemberUpdated,
    ) -> Result<Handled, WatchError> {
        let old_name = display_name(&member_update.old_chat_member.user);
        let new_name = display_name(&member_update.new_chat_member.user);

        if old_name == new_name {
            // Covers joins, leaves, and promotions: identity unchanged.
            debug!(chat_id = member_update.chat.id, "member update without a name change");
            return Ok(Handled::Ignored);
        }

        info!(
            chat_id = member_update.chat.id,
            user_id = member_update.new_chat_member.user.id,
            %old_name,
            %new_name,
            "member display name changed"
        );

        self.send(
            member_update.chat.id,
            &notification_text(&old_name, &new_name),
        )
        .await?;

        Ok(Handled::NameChange)
    }

    async fn send(&self, chat_id: i64, text: &str) -> Result<(), WatchError> {
        self.gateway
            .send_message(chat_id, text)
            .await
            .map_err(|source| WatchError::Dispatch { chat_id, source })
    }
}
