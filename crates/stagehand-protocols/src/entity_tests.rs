use super::*;

fn sample_step(status: &str) -> Step {
    Step {
        id: 1,
        step_description_id: 7,
        instance_name: "alice-s1-prep_1".to_string(),
        start_time: Utc::now(),
        stop_time: None,
        status: status.to_string(),
        progress: String::new(),
        command: "sbatch run.sh".to_string(),
        jobid: Some(4242),
    }
}

#[test]
fn canonical_status_of_single_token() {
    assert_eq!(sample_step("RUNNING").canonical_status(), Some(StepStatus::Running));
    assert_eq!(sample_step("STARTING").canonical_status(), Some(StepStatus::Starting));
}

#[test]
fn canonical_status_of_multi_token_is_none() {
    // Heterogeneous jobs carry several tokens; combination happens in the
    // job-manager driver, not here.
    assert_eq!(sample_step("RUNNING STOPPED").canonical_status(), None);
}

#[test]
fn object_type_round_trip() {
    for ty in [
        ObjectType::Session,
        ObjectType::Service,
        ObjectType::StepDescription,
        ObjectType::Step,
    ] {
        assert_eq!(ObjectType::parse(ty.as_str()), Some(ty));
    }
    assert_eq!(ObjectType::parse("workflow"), None);
}

#[test]
fn session_serializes_flat() {
    let session = Session {
        id: 3,
        name: "s1".to_string(),
        workflow_name: "lqcd".to_string(),
        user_name: "alice".to_string(),
        start_time: Utc::now(),
        end_time: None,
        status: SessionStatus::Starting,
    };
    let value = serde_json::to_value(&session).unwrap();
    assert_eq!(value["name"], "s1");
    assert_eq!(value["status"], "STARTING");
    assert!(value["end_time"].is_null());
}
