//! Telegram Bot API wire types (minimal subset).
//!
//! Only the fields this bot reads are modelled; everything else in the
//! payload is ignored during deserialization.

use serde::Deserialize;

/// Generic Telegram Bot API response wrapper.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Payload, present when `ok` is true.
    pub result: Option<T>,
    /// Human-readable error description, present when `ok` is false.
    pub description: Option<String>,
    /// Numeric error code, present when `ok` is false.
    pub error_code: Option<i64>,
}

/// Telegram `Update` object.
///
/// Update categories other than the two below deserialize with both fields
/// `None` and are ignored by the handler.
#[derive(Debug, Deserialize)]
pub struct Update {
    /// Monotonically increasing update identifier.
    pub update_id: i64,
    /// A new incoming message, if this is a `message` update.
    #[serde(default)]
    pub message: Option<Message>,
    /// A chat member status/profile change, if this is a `chat_member` update.
    #[serde(default)]
    pub chat_member: Option<ChatMemberUpdated>,
}

/// Telegram `ChatMemberUpdated` object: old and new snapshots of one member
/// within one chat.
#[derive(Debug, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat the change happened in.
    pub chat: Chat,
    /// Member state before the change.
    pub old_chat_member: ChatMember,
    /// Member state after the change.
    pub new_chat_member: ChatMember,
}

/// Telegram `ChatMember` object.
#[derive(Debug, Deserialize)]
pub struct ChatMember {
    /// Membership status (`member`, `administrator`, `left`, ...).
    pub status: String,
    /// The user this membership entry describes.
    pub user: User,
}

/// Telegram `User` object.
#[derive(Debug, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Telegram `Chat` object.
#[derive(Debug, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: i64,
}

/// Telegram `Message` object (subset of fields we use).
#[derive(Debug, Deserialize)]
pub struct Message {
    /// Chat the message was posted in.
    pub chat: Chat,
    /// Text content, absent for media messages.
    #[serde(default)]
    pub text: Option<String>,
}
