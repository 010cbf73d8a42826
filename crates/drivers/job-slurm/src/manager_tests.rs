use super::*;

use std::os::unix::fs::PermissionsExt;

fn commands_with(batch_cmd: &str, state_cmd: &str, control_cmd: &str) -> SchedulerCommands {
    SchedulerCommands {
        batch_cmd: batch_cmd.to_string(),
        cancel_cmd: "/bin/true".to_string(),
        state_cmd: state_cmd.to_string(),
        control_cmd: control_cmd.to_string(),
        lua_directives: false,
        command_timeout_secs: 5,
        script_dir: std::env::temp_dir().display().to_string(),
    }
}

/// A fake scheduler binary that prints `output` and exits 0.
fn fake_command(dir: &tempfile::TempDir, name: &str, output: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\necho \"{output}\"\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[test]
fn script_contains_directive_and_command() {
    let request = SubmitRequest {
        job_name: "create".to_string(),
        directives: Some("SBB create_persistent Name=bb1 Flavor=small Targets=/a".to_string()),
        command: "srun hostname".to_string(),
        partition: None,
        dependency: None,
    };
    let script = build_script(&request, "/tmp");
    assert!(script.starts_with("#!/bin/bash\n"));
    assert!(script.contains("#SBATCH --output=/tmp/out-create-%j.txt"));
    assert!(script.contains("#SBATCH --error=/tmp/err-create-%j.txt"));
    assert!(script.contains("#SBB create_persistent Name=bb1 Flavor=small Targets=/a\n"));
    assert!(script.ends_with("srun hostname\n"));
}

#[test]
fn script_without_directive_has_no_stray_hash_line() {
    let request = SubmitRequest {
        job_name: "step".to_string(),
        directives: None,
        command: "sbatch run.sh".to_string(),
        ..Default::default()
    };
    let script = build_script(&request, "/tmp");
    let directive_lines: Vec<&str> = script
        .lines()
        .filter(|l| l.starts_with('#') && !l.starts_with("#!") && !l.starts_with("#SBATCH"))
        .collect();
    assert!(directive_lines.is_empty());
}

#[test]
fn parses_submission_acknowledgement() {
    assert_eq!(parse_submitted_jobid("Submitted batch job 4242\n"), Some(4242));
    assert_eq!(
        parse_submitted_jobid("sbatch: verbose noise\nSubmitted batch job 7\n"),
        Some(7)
    );
    assert_eq!(parse_submitted_jobid("error: something went wrong"), None);
    assert_eq!(parse_submitted_jobid("Submitted batch job banana"), None);
    assert_eq!(parse_submitted_jobid(""), None);
}

#[tokio::test]
async fn submit_through_fake_scheduler_returns_jobid() {
    let dir = tempfile::tempdir().unwrap();
    let sbatch = fake_command(&dir, "sbatch", "Submitted batch job 4242");
    let manager = SlurmJobManager::new(commands_with(&sbatch, "/bin/true", "/bin/true"));

    let jobid = manager
        .submit(SubmitRequest {
            job_name: "create".to_string(),
            directives: Some("SBB create_persistent Name=bb1".to_string()),
            command: "srun hostname".to_string(),
            partition: Some("part0".to_string()),
            dependency: Some(17),
        })
        .await
        .unwrap();
    assert_eq!(jobid, 4242);
}

#[tokio::test]
async fn submit_with_unparseable_acknowledgement_is_missing_jobid() {
    let dir = tempfile::tempdir().unwrap();
    let sbatch = fake_command(&dir, "sbatch", "queue is on fire");
    let manager = SlurmJobManager::new(commands_with(&sbatch, "/bin/true", "/bin/true"));

    let result = manager.submit(SubmitRequest::default()).await;
    assert!(matches!(result, Err(JobError::MissingJobId(_))));
}

#[tokio::test]
async fn submit_spawn_failure_is_an_error() {
    let manager =
        SlurmJobManager::new(commands_with("/nonexistent/sbatch", "/bin/true", "/bin/true"));
    let result = manager.submit(SubmitRequest::default()).await;
    assert!(matches!(result, Err(JobError::Spawn(_))));
}

#[tokio::test]
async fn vanished_job_reports_native_stopped() {
    // state command succeeds with empty output: the job just finished.
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", "/bin/true"));
    assert_eq!(manager.get_job_status(42).await, "STOPPED");
}

#[tokio::test]
async fn failing_state_command_reports_native_stopped() {
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/false", "/bin/true"));
    assert_eq!(manager.get_job_status(42).await, "STOPPED");
}

#[tokio::test]
async fn heterogeneous_status_keeps_all_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let squeue = fake_command(&dir, "squeue", "RUNNING\nPENDING");
    let manager = SlurmJobManager::new(commands_with("/bin/true", &squeue, "/bin/true"));
    assert_eq!(manager.get_job_status(42).await, "RUNNING PENDING");
}

#[tokio::test]
async fn failing_report_command_is_unknown_not_stopped() {
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", "/bin/false"));
    assert_eq!(manager.buffer_status("bb1").await, ServiceStatus::Unknown);
}

#[tokio::test]
async fn empty_report_means_buffer_torn_down() {
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", "/bin/true"));
    assert_eq!(manager.buffer_status("bb1").await, ServiceStatus::Stopped);
}

#[tokio::test]
async fn buffer_status_parses_report_output() {
    let dir = tempfile::tempdir().unwrap();
    let scontrol = fake_command(
        &dir,
        "scontrol",
        "  Allocated Buffers:\n    Name=bb1 Size=20MiB State=staged-in UserID=alice(1000)",
    );
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", &scontrol));
    assert_eq!(manager.buffer_status("bb1").await, ServiceStatus::Allocated);
}

#[tokio::test]
async fn locations_parsed_from_partition_listing() {
    let dir = tempfile::tempdir().unwrap();
    let scontrol = fake_command(
        &dir,
        "scontrol",
        "PartitionName=part0 Nodes=n[0-3] State=UP\nPartitionName=part1 Nodes=n[4-7] State=UP",
    );
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", &scontrol));
    let locations = manager.get_usable_locations().await;
    let names: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["part0", "part1"]);
}

#[tokio::test]
async fn failing_partition_listing_is_empty() {
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", "/bin/false"));
    assert!(manager.get_usable_locations().await.is_empty());
}

#[tokio::test]
async fn cancel_returns_command_exit_code() {
    let manager = SlurmJobManager::new(commands_with("/bin/true", "/bin/true", "/bin/true"));
    assert_eq!(manager.cancel_job(42).await, 0);

    let mut commands = commands_with("/bin/true", "/bin/true", "/bin/true");
    commands.cancel_cmd = "/bin/false".to_string();
    let manager = SlurmJobManager::new(commands);
    assert_eq!(manager.cancel_job(42).await, 1);
}
