use thiserror::Error;
use vaas_client::ApiError;

use crate::message::{MESSAGE_MAX_CHARS, USERNAME_MAX_CHARS};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username must be at most {USERNAME_MAX_CHARS} characters")]
    UsernameTooLong,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message must be at most {MESSAGE_MAX_CHARS} characters")]
    MessageTooLong,
    #[error("already in the chatroom")]
    AlreadyEntered,
    #[error("not in the chatroom")]
    NotEntered,
    #[error("chat log is not a JSON-encoded message list: {0}")]
    MalformedLog(String),
}
