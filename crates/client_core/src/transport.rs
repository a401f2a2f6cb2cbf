//! UDP transport: range validation, encoding and one datagram per command.
//!
//! Sockets open lazily, one per address family, and all of them close
//! together. A closed transport refuses every later send.

use std::{
    fmt, io,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{protocol::CanonicalCommand, wire::WireEncoding};
use tokio::{net::UdpSocket, sync::Mutex};
use tracing::{debug, info};

use crate::error::DispatchError;

const BYTE_RANGE: std::ops::RangeInclusive<i64> = 0..=255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub ip: String,
    pub port: u16,
}

impl Target {
    async fn socket_addr(&self) -> Result<SocketAddr, DispatchError> {
        if let Ok(ip) = self.ip.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        tokio::net::lookup_host((self.ip.as_str(), self.port))
            .await
            .map_err(|error| {
                DispatchError::SendFailed(format!("cannot resolve {self}: {error}"))
            })?
            .next()
            .ok_or_else(|| DispatchError::SendFailed(format!("no address found for {self}")))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[async_trait]
pub trait DatagramSocket: Send + Sync {
    async fn send_to(&self, datagram: &[u8], addr: SocketAddr) -> io::Result<usize>;
}

#[async_trait]
impl DatagramSocket for UdpSocket {
    async fn send_to(&self, datagram: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, datagram, addr).await
    }
}

/// Opens a socket able to reach the address family of `target`.
#[async_trait]
pub trait SocketBinder: Send + Sync {
    async fn bind(&self, target: SocketAddr) -> io::Result<Arc<dyn DatagramSocket>>;
}

pub struct UdpBinder;

#[async_trait]
impl SocketBinder for UdpBinder {
    async fn bind(&self, target: SocketAddr) -> io::Result<Arc<dyn DatagramSocket>> {
        let local = if target.is_ipv4() {
            SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0)
        } else {
            SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0)
        };
        Ok(Arc::new(UdpSocket::bind(local).await?))
    }
}

#[derive(Default)]
struct Sockets {
    v4: Option<Arc<dyn DatagramSocket>>,
    v6: Option<Arc<dyn DatagramSocket>>,
}

impl Sockets {
    fn slot(&mut self, addr: SocketAddr) -> &mut Option<Arc<dyn DatagramSocket>> {
        if addr.is_ipv4() {
            &mut self.v4
        } else {
            &mut self.v6
        }
    }

    fn is_empty(&self) -> bool {
        self.v4.is_none() && self.v6.is_none()
    }
}

enum SocketState {
    Open(Sockets),
    Closed,
}

/// Fire-and-forget datagram sender owning its lazily opened sockets.
pub struct Transport {
    binder: Arc<dyn SocketBinder>,
    encoding: WireEncoding,
    state: Mutex<SocketState>,
}

impl Transport {
    pub fn new(binder: Arc<dyn SocketBinder>, encoding: WireEncoding) -> Self {
        Self {
            binder,
            encoding,
            state: Mutex::new(SocketState::Open(Sockets::default())),
        }
    }

    pub fn encoding(&self) -> WireEncoding {
        self.encoding
    }

    /// Range checks and encodes `command`. Nothing touches the socket.
    pub fn prepare(&self, command: &CanonicalCommand) -> Result<Vec<u8>, DispatchError> {
        validate(command)?;
        Ok(self.encoding.encode(command)?)
    }

    pub async fn send(
        &self,
        command: &CanonicalCommand,
        target: &Target,
    ) -> Result<(), DispatchError> {
        let datagram = self.prepare(command)?;
        self.deliver(&datagram, target).await
    }

    /// Writes one already encoded datagram. Never retried.
    pub async fn deliver(&self, datagram: &[u8], target: &Target) -> Result<(), DispatchError> {
        if self.is_closed().await {
            return Err(DispatchError::TransportClosed);
        }

        let addr = target.socket_addr().await?;
        let socket = self.socket(addr).await?;
        socket
            .send_to(datagram, addr)
            .await
            .map_err(|error| {
                DispatchError::SendFailed(format!("send to {target} failed: {error}"))
            })?;
        debug!(to = %target, bytes = datagram.len(), "datagram sent");
        Ok(())
    }

    /// Closes every socket. Returns false when the transport was already closed.
    pub async fn close(&self) -> bool {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, SocketState::Closed) {
            SocketState::Closed => false,
            SocketState::Open(sockets) => {
                if !sockets.is_empty() {
                    info!("udp sockets closed");
                }
                true
            }
        }
    }

    pub async fn is_closed(&self) -> bool {
        matches!(*self.state.lock().await, SocketState::Closed)
    }

    async fn socket(&self, addr: SocketAddr) -> Result<Arc<dyn DatagramSocket>, DispatchError> {
        let mut state = self.state.lock().await;
        let SocketState::Open(sockets) = &mut *state else {
            return Err(DispatchError::TransportClosed);
        };

        let slot = sockets.slot(addr);
        if let Some(socket) = slot.as_ref() {
            return Ok(Arc::clone(socket));
        }

        let socket = self
            .binder
            .bind(addr)
            .await
            .map_err(|error| DispatchError::SendFailed(format!("cannot open socket: {error}")))?;
        debug!(ipv4 = addr.is_ipv4(), "udp socket opened");
        *slot = Some(Arc::clone(&socket));
        Ok(socket)
    }
}

fn validate(command: &CanonicalCommand) -> Result<(), DispatchError> {
    let (field, value) = match command {
        CanonicalCommand::Brightness { value } => ("brightness", *value),
        CanonicalCommand::Text(text) => ("intensity", text.intensity),
        _ => return Ok(()),
    };

    if BYTE_RANGE.contains(&value) {
        Ok(())
    } else {
        Err(DispatchError::invalid(format!("{field} must be 0-255, got {value}")))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
