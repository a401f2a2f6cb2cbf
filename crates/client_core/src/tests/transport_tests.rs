use super::*;
use crate::test_support::RecordingBinder;
use shared::domain::SegmentId;

fn transport(binder: &RecordingBinder, encoding: WireEncoding) -> Transport {
    Transport::new(Arc::new(binder.clone()), encoding)
}

fn local(port: u16) -> Target {
    Target {
        ip: "127.0.0.1".into(),
        port,
    }
}

#[tokio::test]
async fn brightness_range_is_checked_before_sending() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);

    for value in [256, -1] {
        let err = transport
            .send(&CanonicalCommand::Brightness { value }, &local(9000))
            .await
            .expect_err("out of range");
        assert!(matches!(err, DispatchError::ValidationFailed(_)));
    }
    assert_eq!(binder.binds(), 0);
    assert!(binder.sent().is_empty());

    transport
        .send(&CanonicalCommand::Brightness { value: 128 }, &local(9000))
        .await
        .expect("in range");
    assert_eq!(binder.sent().len(), 1);
}

#[tokio::test]
async fn text_intensity_is_range_checked() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    let command = CanonicalCommand::Text(shared::protocol::TextCommand {
        seg: SegmentId(0),
        text: "x".into(),
        color: "FFFFFF".into(),
        bgcolor: "000000".into(),
        font: "arial".into(),
        size: "auto".into(),
        align: Default::default(),
        effect: Default::default(),
        intensity: 300,
    });
    let err = transport
        .send(&command, &local(9000))
        .await
        .expect_err("intensity out of range");
    assert!(matches!(err, DispatchError::ValidationFailed(_)));
    assert!(binder.sent().is_empty());
}

#[tokio::test]
async fn socket_is_opened_once_and_reused() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    assert_eq!(binder.binds(), 0);

    for port in [9000, 9001, 9002] {
        transport
            .send(&CanonicalCommand::ClearAll, &local(port))
            .await
            .expect("send");
    }

    assert_eq!(binder.binds(), 1);
    let sent = binder.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].0, br#"{"cmd":"clear_all"}"#);
    assert_eq!(sent[2].1, "127.0.0.1:9002".parse::<SocketAddr>().expect("addr"));
}

#[tokio::test]
async fn delimited_encoding_is_selectable() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Delimited);
    transport
        .send(&CanonicalCommand::Clear { seg: SegmentId(1) }, &local(9000))
        .await
        .expect("send");
    assert_eq!(binder.sent()[0].0, b"CLEAR|1\n");

    let err = transport
        .send(
            &CanonicalCommand::Orientation {
                value: "portrait".into(),
            },
            &local(9000),
        )
        .await
        .expect_err("no line form");
    assert!(matches!(err, DispatchError::ValidationFailed(_)));
    assert_eq!(binder.sent().len(), 1);
}

#[tokio::test]
async fn socket_errors_surface_as_send_failed() {
    let binder = RecordingBinder::failing(io::ErrorKind::ConnectionRefused);
    let transport = transport(&binder, WireEncoding::Json);
    let err = transport
        .send(&CanonicalCommand::ClearAll, &local(9000))
        .await
        .expect_err("unreachable");
    assert!(matches!(err, DispatchError::SendFailed(_)));
}

#[tokio::test]
async fn closed_transport_never_reaches_the_network() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    transport
        .send(&CanonicalCommand::ClearAll, &local(9000))
        .await
        .expect("send");

    assert!(transport.close().await);
    assert!(!transport.close().await);
    assert!(transport.is_closed().await);

    let err = transport
        .send(&CanonicalCommand::ClearAll, &local(9000))
        .await
        .expect_err("closed");
    assert_eq!(err, DispatchError::TransportClosed);
    assert_eq!(binder.binds(), 1);
    assert_eq!(binder.sent().len(), 1);
}

#[tokio::test]
async fn closing_before_first_use_never_binds() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    assert!(transport.close().await);

    let err = transport
        .send(&CanonicalCommand::ClearAll, &local(9000))
        .await
        .expect_err("closed");
    assert_eq!(err, DispatchError::TransportClosed);
    assert_eq!(binder.binds(), 0);
}

#[test]
fn target_displays_as_host_and_port() {
    assert_eq!(local(21324).to_string(), "127.0.0.1:21324");
}

#[tokio::test]
async fn each_address_family_gets_its_own_socket() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    let v6 = Target {
        ip: "::1".into(),
        port: 9000,
    };

    transport
        .send(&CanonicalCommand::ClearAll, &local(9000))
        .await
        .expect("ipv4 send");
    transport
        .send(&CanonicalCommand::ClearAll, &v6)
        .await
        .expect("ipv6 send after ipv4");
    transport
        .send(&CanonicalCommand::ClearAll, &local(9001))
        .await
        .expect("ipv4 again");

    let bound = binder.bound_for();
    assert_eq!(bound.len(), 2);
    assert!(bound[0].is_ipv4());
    assert!(bound[1].is_ipv6());
    let sent = binder.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].1, "[::1]:9000".parse::<SocketAddr>().expect("addr"));

    assert!(transport.close().await);
    let err = transport
        .send(&CanonicalCommand::ClearAll, &v6)
        .await
        .expect_err("closed");
    assert_eq!(err, DispatchError::TransportClosed);
    assert_eq!(binder.binds(), 2);
}

#[tokio::test]
async fn raw_records_pass_through_without_range_checks() {
    let binder = RecordingBinder::default();
    let transport = transport(&binder, WireEncoding::Json);
    let raw = serde_json::json!({"cmd": "brightness", "value": 999});
    let command = CanonicalCommand::Raw(raw.as_object().cloned().expect("object"));

    transport.send(&command, &local(9000)).await.expect("opaque");

    let sent: serde_json::Value =
        serde_json::from_slice(&binder.sent()[0].0).expect("json datagram");
    assert_eq!(sent, raw);
}
