//! Namewatch — a Telegram bot that announces member name changes.
//!
//! Single Rust binary. Long-polls the Bot API for `chat_member` updates in
//! the groups the bot belongs to and posts a notification into the chat
//! whenever a member's display name changes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;
pub mod subscriber;
pub mod supervisor;
pub mod telegram;
pub mod watcher;
