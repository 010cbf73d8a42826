use super::*;

#[test]
fn session_status_round_trip() {
    for status in [
        SessionStatus::Starting,
        SessionStatus::Active,
        SessionStatus::Stopping,
        SessionStatus::Stopped,
        SessionStatus::Teardown,
    ] {
        assert_eq!(SessionStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(SessionStatus::parse("RESTING"), None);
}

#[test]
fn terminal_sessions() {
    assert!(SessionStatus::Stopped.is_terminal());
    assert!(SessionStatus::Teardown.is_terminal());
    assert!(!SessionStatus::Starting.is_terminal());
    assert!(!SessionStatus::Active.is_terminal());
    assert!(!SessionStatus::Stopping.is_terminal());
}

#[test]
fn allocated_covers_staged_in() {
    assert!(ServiceStatus::Allocated.is_allocated());
    assert!(ServiceStatus::StagedIn.is_allocated());
    assert!(!ServiceStatus::Waiting.is_allocated());
    assert!(!ServiceStatus::Stopped.is_allocated());
}

#[test]
fn stopped_covers_staged_out() {
    assert!(ServiceStatus::Stopped.is_stopped());
    assert!(ServiceStatus::StagedOut.is_stopped());
    assert!(!ServiceStatus::Stopping.is_stopped());
}

#[test]
fn stoppable_states() {
    assert!(ServiceStatus::Allocated.is_stoppable());
    assert!(ServiceStatus::StagedIn.is_stoppable());
    assert!(ServiceStatus::Waiting.is_stoppable());
    assert!(!ServiceStatus::Stopping.is_stoppable());
    assert!(!ServiceStatus::Stopped.is_stoppable());
    assert!(!ServiceStatus::Unknown.is_stoppable());
}

#[test]
fn service_status_round_trip() {
    for status in [
        ServiceStatus::Waiting,
        ServiceStatus::StagingIn,
        ServiceStatus::StagedIn,
        ServiceStatus::Allocated,
        ServiceStatus::StagingOut,
        ServiceStatus::StagedOut,
        ServiceStatus::Stopping,
        ServiceStatus::Stopped,
        ServiceStatus::Teardown,
        ServiceStatus::Unknown,
    ] {
        assert_eq!(ServiceStatus::parse(status.as_str()), Some(status));
    }
}

#[test]
fn step_status_round_trip() {
    for status in [
        StepStatus::Starting,
        StepStatus::Running,
        StepStatus::Stopping,
        StepStatus::Stopped,
        StepStatus::Suspended,
    ] {
        assert_eq!(StepStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(StepStatus::parse("running"), None, "parsing is case-sensitive");
}

#[test]
fn activity_round_trip() {
    assert_eq!(Activity::parse("creation"), Some(Activity::Creation));
    assert_eq!(Activity::parse("removal"), Some(Activity::Removal));
    assert_eq!(Activity::parse("update"), None);
}

#[test]
fn serde_uses_wire_names() {
    let json = serde_json::to_string(&SessionStatus::Starting).unwrap();
    assert_eq!(json, "\"STARTING\"");
    let json = serde_json::to_string(&Activity::Removal).unwrap();
    assert_eq!(json, "\"removal\"");
}
