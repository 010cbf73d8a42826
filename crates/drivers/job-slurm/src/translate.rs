//! Native status vocabulary and its canonical translation.
//!
//! Slurm's job states are richer than the canonical set; the mapping here
//! is total and anything unrecognized fails closed to `STOPPED` so that a
//! garbled scheduler answer can never keep a session alive forever.

use stagehand_protocols::status::StepStatus;

/// The native stopped token, also used as the fallback for combinations.
pub const NATIVE_STOPPED: &str = "STOPPED";

/// States that mean a job component failed.
const FAILURE: &[&str] = &[
    "BOOT_FAIL",
    "DEADLINE",
    "FAILED",
    "NODE_FAIL",
    "OUT_OF_MEMORY",
    "TIMEOUT",
];

/// States that mean a component is held or being requeued.
const HELD_OR_REQUEUED: &[&str] = &["RESV_DEL_HOLD", "REQUEUE_FED", "REQUEUE_HOLD"];

/// States that mean a component has not started yet.
const WAITING: &[&str] = &["CONFIGURING", "PENDING"];

/// Transient states a running component can pass through.
const SPECIAL: &[&str] = &["RESIZING", "SIGNALING"];

const RUNNING: &[&str] = &["RUNNING"];

/// States on the way down.
const STOPPING: &[&str] = &["COMPLETING", "STAGE_OUT", "REQUEUED"];

/// States in which cancelling the job still means something.
const UNSTOPPABLE: &[&str] = &[
    "CONFIGURING",
    "COMPLETING",
    "PENDING",
    "RUNNING",
    "RESV_DEL_HOLD",
    "REQUEUE_FED",
    "REQUEUE_HOLD",
    "REQUEUED",
    "RESIZING",
    "SIGNALING",
    "STAGE_OUT",
    "SUSPENDED",
];

/// Translate one native token into the canonical vocabulary. Total.
pub fn to_canonical(native: &str) -> StepStatus {
    match native {
        "CONFIGURING" | "PENDING" | "RESV_DEL_HOLD" => StepStatus::Starting,
        "RUNNING" | "RESIZING" | "SIGNALING" => StepStatus::Running,
        "COMPLETING" | "REQUEUED" | "STAGE_OUT" => StepStatus::Stopping,
        "REQUEUE_FED" | "REQUEUE_HOLD" | "SUSPENDED" => StepStatus::Suspended,
        "BOOT_FAIL" | "CANCELLED" | "COMPLETED" | "DEADLINE" | "FAILED" | "NODE_FAIL"
        | "OUT_OF_MEMORY" | "PREEMPTED" | "REVOKED" | "SPECIAL_EXIT" | "STOPPED" | "TIMEOUT" => {
            StepStatus::Stopped
        }
        // The scheduler may grow states we have never heard of; assume the
        // job is gone rather than wedging the workflow.
        _ => StepStatus::Stopped,
    }
}

/// Reduce blank-separated tokens of a heterogeneous job to the single one
/// most worth displaying.
///
/// Precedence, most interesting first: failure, held/requeued, waiting,
/// resizing/signaling, running, stopping. Only when every component is in
/// a stopped state does the combination report `STOPPED`.
pub fn combine_for_output(tokens: &str) -> String {
    let list: Vec<&str> = tokens.split_whitespace().collect();
    if list.len() == 1 {
        return list[0].to_string();
    }

    for group in [FAILURE, HELD_OR_REQUEUED, WAITING, SPECIAL, RUNNING, STOPPING] {
        if let Some(tok) = list.iter().find(|tok| group.contains(*tok)) {
            return tok.to_string();
        }
    }
    NATIVE_STOPPED.to_string()
}

/// Reduce blank-separated tokens to the one that decides whether a cancel
/// is still meaningful: any component that can still be stopped wins.
pub fn combine_for_stopping(tokens: &str) -> String {
    let list: Vec<&str> = tokens.split_whitespace().collect();
    if list.len() == 1 {
        return list[0].to_string();
    }

    if let Some(tok) = list.iter().find(|tok| UNSTOPPABLE.contains(*tok)) {
        return tok.to_string();
    }
    NATIVE_STOPPED.to_string()
}

#[cfg(test)]
#[path = "translate_tests.rs"]
mod tests;
