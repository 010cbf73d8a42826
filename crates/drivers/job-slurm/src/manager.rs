//! The Slurm job-manager driver.

use std::io::Write;

use async_trait::async_trait;

use stagehand_config::SchedulerCommands;
use stagehand_protocols::error::JobError;
use stagehand_protocols::job::{JobManagerDriver, SubmitRequest};
use stagehand_protocols::status::{ServiceStatus, StepStatus};
use stagehand_protocols::workflow::Location;

use crate::process::run;
use crate::report::{COMPACT_MARKER, VERBOSE_MARKER, buffer_status_from_report};
use crate::translate;

const SUBMITTED_PREFIX: &str = "Submitted batch job ";

/// Job-manager driver for a Slurm-like scheduler.
pub struct SlurmJobManager {
    commands: SchedulerCommands,
}

impl SlurmJobManager {
    pub fn new(commands: SchedulerCommands) -> Self {
        Self { commands }
    }

    fn timeout(&self) -> u64 {
        self.commands.command_timeout_secs
    }
}

#[async_trait]
impl JobManagerDriver for SlurmJobManager {
    fn id(&self) -> &str {
        "slurm"
    }

    fn to_canonical_status(&self, native: &str) -> StepStatus {
        translate::to_canonical(native)
    }

    fn combine_status_for_output(&self, tokens: &str) -> String {
        translate::combine_for_output(tokens)
    }

    fn combine_status_for_stopping(&self, tokens: &str) -> String {
        translate::combine_for_stopping(tokens)
    }

    async fn get_job_status(&self, jobid: i64) -> String {
        let args = vec![
            "-h".to_string(),
            "--job".to_string(),
            jobid.to_string(),
            "--format=%T".to_string(),
        ];
        let output = match run(&self.commands.state_cmd, &args, self.timeout()).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(jobid, error = %e, "job status query failed");
                return translate::NATIVE_STOPPED.to_string();
            }
        };

        // A job the scheduler no longer lists finished long ago; an empty
        // answer means it just finished.
        if !output.success() || output.stdout.trim().is_empty() {
            return translate::NATIVE_STOPPED.to_string();
        }

        // One line per component for heterogeneous jobs; keep them all,
        // blank-separated, and let the combination rules sort it out.
        let status = output
            .stdout
            .split_whitespace()
            .map(|tok| tok.to_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(jobid, status, "job status");
        status
    }

    async fn cancel_job(&self, jobid: i64) -> i32 {
        tracing::info!(jobid, "cancelling job");
        let args = vec![jobid.to_string()];
        match run(&self.commands.cancel_cmd, &args, self.timeout()).await {
            Ok(output) => output.code,
            Err(e) => {
                tracing::error!(jobid, error = %e, "cancel command failed");
                -1
            }
        }
    }

    async fn get_usable_locations(&self) -> Vec<Location> {
        let args = vec![
            "--hide".to_string(),
            "-o".to_string(),
            "show".to_string(),
            "partitions".to_string(),
        ];
        let output = match run(&self.commands.control_cmd, &args, self.timeout()).await {
            Ok(output) if output.success() => output,
            Ok(output) => {
                tracing::error!(code = output.code, "partition listing failed");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(error = %e, "partition listing failed");
                return Vec::new();
            }
        };

        // One partition per line: `PartitionName=part0 <other fields>`.
        let mut locations = Vec::new();
        for line in output.stdout.lines() {
            let Some(first) = line.split_whitespace().next() else {
                continue;
            };
            if let Some(name) = first.strip_prefix("PartitionName=") {
                locations.push(Location {
                    name: name.to_string(),
                });
            }
        }
        if locations.is_empty() {
            tracing::error!("no partition available");
        }
        locations
    }

    async fn buffer_status(&self, name: &str) -> ServiceStatus {
        let (subcommand, marker) = if self.commands.lua_directives {
            ("bbstat", COMPACT_MARKER)
        } else {
            ("burst", VERBOSE_MARKER)
        };
        let args = vec!["show".to_string(), subcommand.to_string()];
        let output = match run(&self.commands.control_cmd, &args, self.timeout()).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(name, error = %e, "buffer status command failed");
                return ServiceStatus::Unknown;
            }
        };
        // Distinct from "not found": the command itself failing tells us
        // nothing about the buffer.
        if !output.success() {
            tracing::error!(name, code = output.code, stderr = %output.stderr.trim(),
                "buffer status command exited nonzero");
            return ServiceStatus::Unknown;
        }
        buffer_status_from_report(&output.stdout, name, marker)
    }

    async fn submit(&self, request: SubmitRequest) -> Result<i64, JobError> {
        let script = build_script(&request, &self.commands.script_dir);
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}.", request.job_name))
            .suffix(".sbatch")
            .tempfile_in(&self.commands.script_dir)
            .map_err(|e| JobError::Script(e.to_string()))?;
        file.write_all(script.as_bytes())
            .map_err(|e| JobError::Script(e.to_string()))?;

        let mut args = vec!["-J".to_string(), request.job_name.clone()];
        if let Some(partition) = &request.partition {
            if !partition.is_empty() {
                args.push("-p".to_string());
                args.push(partition.clone());
            }
        }
        if let Some(dependency) = request.dependency {
            args.push(format!("--dependency=afterany:{dependency}"));
        }
        args.push(file.path().display().to_string());

        let output = run(&self.commands.batch_cmd, &args, self.timeout()).await?;
        if !output.success() {
            return Err(JobError::Rejected(if output.stderr.trim().is_empty() {
                format!("exit code {}", output.code)
            } else {
                output.stderr.trim().to_string()
            }));
        }

        let jobid = parse_submitted_jobid(&output.stdout)
            .ok_or_else(|| JobError::MissingJobId(output.stdout.trim().to_string()))?;
        tracing::info!(job_name = %request.job_name, jobid, "submitted batch job");
        Ok(jobid)
    }
}

/// Render the batch script for a submission.
fn build_script(request: &SubmitRequest, script_dir: &str) -> String {
    let mut script = String::from("#!/bin/bash\n");
    script.push_str(&format!(
        "#SBATCH --output={script_dir}/out-{}-%j.txt\n",
        request.job_name
    ));
    script.push_str(&format!(
        "#SBATCH --error={script_dir}/err-{}-%j.txt\n",
        request.job_name
    ));
    if let Some(directives) = &request.directives {
        if !directives.is_empty() {
            script.push_str(&format!("#{directives}\n"));
        }
    }
    script.push_str(&request.command);
    script.push('\n');
    script
}

/// Extract the job id from the scheduler's submission acknowledgement.
fn parse_submitted_jobid(stdout: &str) -> Option<i64> {
    let line = stdout.lines().find(|l| l.starts_with(SUBMITTED_PREFIX))?;
    line[SUBMITTED_PREFIX.len()..].trim().parse().ok()
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
