use std::{
    io,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    resolver::InputRecord,
    transport::{DatagramSocket, SocketBinder},
};

pub fn record(value: Value) -> InputRecord {
    value.as_object().cloned().expect("test record must be an object")
}

#[derive(Default)]
struct Wire {
    bound: Vec<SocketAddr>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
}

/// Binder whose socket records datagrams instead of touching the network.
#[derive(Clone, Default)]
pub struct RecordingBinder {
    wire: Arc<Mutex<Wire>>,
    fail_sends: Option<io::ErrorKind>,
}

impl RecordingBinder {
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            fail_sends: Some(kind),
            ..Self::default()
        }
    }

    pub fn binds(&self) -> usize {
        self.wire.lock().expect("wire").bound.len()
    }

    /// Targets that caused a socket to be opened, in bind order.
    pub fn bound_for(&self) -> Vec<SocketAddr> {
        self.wire.lock().expect("wire").bound.clone()
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.wire.lock().expect("wire").sent.clone()
    }
}

struct RecordingSocket {
    wire: Arc<Mutex<Wire>>,
    ipv4: bool,
    fail_sends: Option<io::ErrorKind>,
}

#[async_trait]
impl SocketBinder for RecordingBinder {
    async fn bind(&self, target: SocketAddr) -> io::Result<Arc<dyn DatagramSocket>> {
        self.wire.lock().expect("wire").bound.push(target);
        Ok(Arc::new(RecordingSocket {
            wire: Arc::clone(&self.wire),
            ipv4: target.is_ipv4(),
            fail_sends: self.fail_sends,
        }))
    }
}

#[async_trait]
impl DatagramSocket for RecordingSocket {
    async fn send_to(&self, datagram: &[u8], addr: SocketAddr) -> io::Result<usize> {
        if let Some(kind) = self.fail_sends {
            return Err(io::Error::new(kind, "simulated socket failure"));
        }
        if addr.is_ipv4() != self.ipv4 {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "address family not supported by socket",
            ));
        }
        self.wire
            .lock()
            .expect("wire")
            .sent
            .push((datagram.to_vec(), addr));
        Ok(datagram.len())
    }
}
