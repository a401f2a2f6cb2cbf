use std::time::Duration;

use client_core::{DispatchError, InstanceDefaults, MatrixClient};
use serde_json::json;
use shared::{
    domain::{Align, Effect, SegmentId},
    protocol::{CanonicalCommand, TextCommand},
    wire::{self, WireEncoding},
};
use tokio::{net::UdpSocket, time::timeout};

async fn device() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind device");
    let port = socket.local_addr().expect("local addr").port();
    (socket, port)
}

async fn receive(device: &UdpSocket) -> Vec<u8> {
    let mut buf = vec![0u8; 4096];
    let (len, _) = timeout(Duration::from_secs(2), device.recv_from(&mut buf))
        .await
        .expect("datagram within timeout")
        .expect("recv");
    buf.truncate(len);
    buf
}

fn input(value: serde_json::Value) -> client_core::InputRecord {
    value.as_object().cloned().expect("object")
}

#[tokio::test]
async fn device_decodes_what_the_client_sent() {
    let (device, port) = device().await;
    let client = MatrixClient::new(InstanceDefaults {
        ip: Some("127.0.0.1".into()),
        port: Some(port),
        font: Some("mono9".into()),
        ..InstanceDefaults::default()
    });

    let dispatched = client
        .dispatch(&input(json!({
            "text": "Temp 72.5",
            "seg": 1,
            "color": "#FF8800",
            "align": "R",
            "effect": "fade",
            "intensity": 90
        })))
        .await
        .expect("sent");

    let decoded = wire::decode(&receive(&device).await).expect("device decode");
    assert_eq!(decoded, dispatched.command);
    assert_eq!(
        decoded,
        CanonicalCommand::Text(TextCommand {
            seg: SegmentId(1),
            text: "Temp 72.5".into(),
            color: "FF8800".into(),
            bgcolor: "000000".into(),
            font: "mono9".into(),
            size: "auto".into(),
            align: Align::Right,
            effect: Effect::Fade,
            intensity: 90,
        })
    );

    client.close().await;
    let err = client
        .dispatch(&input(json!({"clear": "all"})))
        .await
        .expect_err("closed");
    assert_eq!(err, DispatchError::TransportClosed);
}

#[tokio::test]
async fn legacy_line_encoding_reaches_the_device() {
    let (device, port) = device().await;
    let client = MatrixClient::new(InstanceDefaults {
        ip: Some("127.0.0.1".into()),
        port: Some(port),
        encoding: Some(WireEncoding::Delimited),
        ..InstanceDefaults::default()
    });

    client
        .dispatch(&input(json!({"brightness": 64})))
        .await
        .expect("sent");
    let datagram = receive(&device).await;
    assert_eq!(datagram, b"BRIGHTNESS|64\n");
    assert_eq!(
        wire::decode(&datagram).expect("decode"),
        CanonicalCommand::Brightness { value: 64 }
    );

    client.close().await;
}

#[tokio::test]
async fn one_client_reaches_ipv4_and_ipv6_devices() {
    let Ok(v6_device) = UdpSocket::bind("[::1]:0").await else {
        // No IPv6 loopback on this host.
        return;
    };
    let v6_port = v6_device.local_addr().expect("local addr").port();
    let (v4_device, v4_port) = device().await;
    let client = MatrixClient::new(InstanceDefaults {
        ip: Some("127.0.0.1".into()),
        port: Some(v4_port),
        ..InstanceDefaults::default()
    });

    client
        .dispatch(&input(json!({"clear": 1})))
        .await
        .expect("ipv4 send");
    client
        .dispatch(&input(json!({"brightness": 30, "ip": "::1", "port": v6_port})))
        .await
        .expect("ipv6 override after ipv4");

    assert_eq!(
        wire::decode(&receive(&v4_device).await).expect("decode"),
        CanonicalCommand::Clear { seg: SegmentId(1) }
    );
    assert_eq!(
        wire::decode(&receive(&v6_device).await).expect("decode"),
        CanonicalCommand::Brightness { value: 30 }
    );

    client.close().await;
}
