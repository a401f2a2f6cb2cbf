//! Host-facing status: the last dispatch outcome, published over a watch channel.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::{error::DispatchError, Dispatched};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Idle,
    Ready,
    Success,
    Error,
}

/// What a host shows for the client: level, short label, optional detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub level: StatusLevel,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Status {
    pub fn ready() -> Self {
        Self {
            level: StatusLevel::Ready,
            label: "ready".into(),
            detail: None,
        }
    }

    pub fn idle() -> Self {
        Self {
            level: StatusLevel::Idle,
            label: String::new(),
            detail: None,
        }
    }

    pub fn sent(dispatched: &Dispatched) -> Self {
        Self {
            level: StatusLevel::Success,
            label: format!("sent to {}", dispatched.target),
            detail: Some(dispatched.command.kind().to_string()),
        }
    }

    pub fn failed(error: &DispatchError) -> Self {
        Self {
            level: StatusLevel::Error,
            label: error.code().label().into(),
            detail: Some(error.to_string()),
        }
    }

    pub fn from_outcome(outcome: &Result<Dispatched, DispatchError>) -> Self {
        match outcome {
            Ok(dispatched) => Self::sent(dispatched),
            Err(error) => Self::failed(error),
        }
    }
}

#[derive(Clone)]
pub struct StatusReporter {
    tx: Arc<watch::Sender<Status>>,
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Status::ready());
        Self { tx: Arc::new(tx) }
    }

    pub fn report(&self, status: Status) {
        self.tx.send_replace(status);
    }

    pub fn current(&self) -> Status {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.tx.subscribe()
    }
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
