use super::*;
use crate::transport::Target;
use shared::protocol::CanonicalCommand;

fn dispatched() -> Dispatched {
    Dispatched {
        command: CanonicalCommand::Brightness { value: 10 },
        target: Target {
            ip: "10.0.0.7".into(),
            port: 21324,
        },
    }
}

#[test]
fn reporter_starts_ready() {
    let reporter = StatusReporter::new();
    assert_eq!(reporter.current(), Status::ready());
    assert_eq!(reporter.current().level, StatusLevel::Ready);
}

#[test]
fn success_carries_target_and_kind() {
    let status = Status::from_outcome(&Ok(dispatched()));
    assert_eq!(status.level, StatusLevel::Success);
    assert_eq!(status.label, "sent to 10.0.0.7:21324");
    assert_eq!(status.detail.as_deref(), Some("brightness"));
}

#[test]
fn failure_carries_the_reason() {
    let status = Status::from_outcome(&Err(DispatchError::SendFailed(
        "connection refused".into(),
    )));
    assert_eq!(status.level, StatusLevel::Error);
    assert_eq!(status.label, "send failed");
    assert_eq!(status.detail.as_deref(), Some("connection refused"));

    let status = Status::failed(&DispatchError::UnrecognizedInput);
    assert_eq!(status.label, "unrecognized input");
}

#[tokio::test]
async fn subscribers_observe_reports() {
    let reporter = StatusReporter::new();
    let mut rx = reporter.subscribe();

    reporter.report(Status::from_outcome(&Ok(dispatched())));
    rx.changed().await.expect("changed");
    assert_eq!(rx.borrow().level, StatusLevel::Success);

    let clone = reporter.clone();
    clone.report(Status::idle());
    rx.changed().await.expect("changed");
    assert_eq!(rx.borrow().level, StatusLevel::Idle);
}
