use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::CommandKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnrecognizedInput,
    ValidationFailed,
    SendFailed,
    TransportClosed,
}

impl ErrorCode {
    pub fn label(self) -> &'static str {
        match self {
            Self::UnrecognizedInput => "unrecognized input",
            Self::ValidationFailed => "validation failed",
            Self::SendFailed => "send failed",
            Self::TransportClosed => "transport closed",
        }
    }
}

#[derive(Debug, Error)]
pub enum WireError {
    #[error("{kind} command has no delimited encoding")]
    UnsupportedKind { kind: CommandKind },
    #[error("field {field} cannot contain '|' or a line break in the delimited encoding")]
    UnrepresentableField { field: &'static str },
    #[error("malformed JSON datagram: {0}")]
    Json(#[from] serde_json::Error),
    #[error("datagram is not valid UTF-8")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("malformed delimited datagram: {0}")]
    Delimited(String),
}
