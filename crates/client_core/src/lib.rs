//! Control-protocol client for a UDP driven RGB LED matrix.
//!
//! Each dispatch runs resolve, classify, normalize and validate on the
//! caller's task, then hands one datagram to the transport. Only the socket
//! write is asynchronous.

use std::sync::Arc;

use serde::Serialize;
use shared::protocol::CanonicalCommand;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub mod classifier;
pub mod defaults;
pub mod error;
pub mod normalizer;
pub mod resolver;
pub mod status;
pub mod transport;

pub use defaults::{load_settings, InstanceDefaults};
pub use error::DispatchError;
pub use resolver::InputRecord;
pub use status::{Status, StatusLevel, StatusReporter};
pub use transport::{SocketBinder, Target, Transport, UdpBinder};

/// What was sent and where, handed back for pass-through and auditing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatched {
    pub command: CanonicalCommand,
    #[serde(flatten)]
    pub target: Target,
}

pub struct MatrixClient {
    defaults: InstanceDefaults,
    transport: Arc<Transport>,
    status: StatusReporter,
}

impl MatrixClient {
    pub fn new(defaults: InstanceDefaults) -> Self {
        Self::with_binder(defaults, Arc::new(UdpBinder))
    }

    pub fn with_binder(defaults: InstanceDefaults, binder: Arc<dyn SocketBinder>) -> Self {
        let transport = Transport::new(binder, defaults.encoding());
        Self {
            defaults,
            transport: Arc::new(transport),
            status: StatusReporter::new(),
        }
    }

    pub fn defaults(&self) -> &InstanceDefaults {
        &self.defaults
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    /// Resolves and normalizes `record` without sending anything.
    pub fn build(&self, record: &InputRecord) -> Result<Dispatched, DispatchError> {
        let kind = classifier::classify(record).ok_or(DispatchError::UnrecognizedInput)?;
        let command = normalizer::normalize(kind, record, &self.defaults)?;
        let target = normalizer::target(record, &self.defaults)?;
        Ok(Dispatched { command, target })
    }

    pub async fn dispatch(&self, record: &InputRecord) -> Result<Dispatched, DispatchError> {
        let (dispatched, datagram) = match self.prepare(record) {
            Ok(prepared) => prepared,
            Err(error) => return Err(self.fail(error)),
        };
        deliver(&self.transport, &self.status, dispatched, datagram).await
    }

    /// Like [`dispatch`](Self::dispatch) but returns as soon as the command is
    /// built; the write runs on a spawned task. Must be called from within a
    /// tokio runtime.
    pub fn dispatch_detached(
        &self,
        record: &InputRecord,
    ) -> JoinHandle<Result<Dispatched, DispatchError>> {
        let prepared = self.prepare(record).map_err(|error| self.fail(error));
        let transport = Arc::clone(&self.transport);
        let status = self.status.clone();

        tokio::spawn(async move {
            match prepared {
                Ok((dispatched, datagram)) => {
                    deliver(&transport, &status, dispatched, datagram).await
                }
                Err(error) => Err(error),
            }
        })
    }

    /// Closes the socket. Later dispatches fail with `TransportClosed`.
    pub async fn close(&self) {
        if self.transport.close().await {
            self.status.report(Status::idle());
        }
    }

    fn prepare(&self, record: &InputRecord) -> Result<(Dispatched, Vec<u8>), DispatchError> {
        let dispatched = self.build(record)?;
        let datagram = self.transport.prepare(&dispatched.command)?;
        Ok((dispatched, datagram))
    }

    fn fail(&self, error: DispatchError) -> DispatchError {
        match &error {
            DispatchError::UnrecognizedInput => {
                warn!("dropping input with no recognized command field")
            }
            other => warn!(error = %other, "command rejected before send"),
        }
        self.status.report(Status::failed(&error));
        error
    }
}

async fn deliver(
    transport: &Transport,
    status: &StatusReporter,
    dispatched: Dispatched,
    datagram: Vec<u8>,
) -> Result<Dispatched, DispatchError> {
    let outcome = transport
        .deliver(&datagram, &dispatched.target)
        .await
        .map(|()| dispatched);

    match &outcome {
        Ok(sent) => info!(
            to = %sent.target,
            kind = %sent.command.kind(),
            encoding = ?transport.encoding(),
            "command sent"
        ),
        Err(DispatchError::TransportClosed) => warn!("send attempted after close"),
        Err(failure) => error!(error = %failure, "send failed"),
    }
    status.report(Status::from_outcome(&outcome));
    outcome
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
