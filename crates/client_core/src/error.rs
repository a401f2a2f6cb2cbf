//! Dispatch failure taxonomy.

use shared::error::{ErrorCode, WireError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("input names no known command")]
    UnrecognizedInput,
    #[error("{0}")]
    ValidationFailed(String),
    #[error("{0}")]
    SendFailed(String),
    #[error("transport is closed")]
    TransportClosed,
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnrecognizedInput => ErrorCode::UnrecognizedInput,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::SendFailed(_) => ErrorCode::SendFailed,
            Self::TransportClosed => ErrorCode::TransportClosed,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }
}

impl From<WireError> for DispatchError {
    fn from(value: WireError) -> Self {
        Self::ValidationFailed(value.to_string())
    }
}
