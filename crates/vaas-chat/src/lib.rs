//! A shared chatroom built on one VaaS variable.
//!
//! The variable's value holds a JSON-encoded, append-only message list.
//! Updates are observed by fixed-interval polling and written by non-atomic
//! read-modify-write; see [`ChatRoom::send`] for the lost-update caveat.

mod error;
mod message;
mod room;

pub use error::ChatError;
pub use message::{
    ChatMessage, MESSAGE_MAX_CHARS, USERNAME_MAX_CHARS, decode_log, encode_log,
};
pub use room::{ChatRoom, DEFAULT_POLL_INTERVAL};
