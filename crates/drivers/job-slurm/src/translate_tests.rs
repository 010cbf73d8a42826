use super::*;

const ALL_NATIVE: &[&str] = &[
    "BOOT_FAIL",
    "CANCELLED",
    "COMPLETED",
    "CONFIGURING",
    "COMPLETING",
    "DEADLINE",
    "FAILED",
    "NODE_FAIL",
    "OUT_OF_MEMORY",
    "PENDING",
    "PREEMPTED",
    "RUNNING",
    "RESV_DEL_HOLD",
    "REQUEUE_FED",
    "REQUEUE_HOLD",
    "REQUEUED",
    "RESIZING",
    "REVOKED",
    "SIGNALING",
    "SPECIAL_EXIT",
    "STAGE_OUT",
    "STOPPED",
    "SUSPENDED",
    "TIMEOUT",
];

#[test]
fn translation_is_total_over_the_native_vocabulary() {
    for native in ALL_NATIVE {
        // Every token maps; the assertion is that no input panics and the
        // result is one of the five canonical values.
        let _ = to_canonical(native);
    }
}

#[test]
fn spot_check_translation_table() {
    assert_eq!(to_canonical("PENDING"), StepStatus::Starting);
    assert_eq!(to_canonical("CONFIGURING"), StepStatus::Starting);
    assert_eq!(to_canonical("RUNNING"), StepStatus::Running);
    assert_eq!(to_canonical("SIGNALING"), StepStatus::Running);
    assert_eq!(to_canonical("COMPLETING"), StepStatus::Stopping);
    assert_eq!(to_canonical("STAGE_OUT"), StepStatus::Stopping);
    assert_eq!(to_canonical("REQUEUE_HOLD"), StepStatus::Suspended);
    assert_eq!(to_canonical("COMPLETED"), StepStatus::Stopped);
    assert_eq!(to_canonical("TIMEOUT"), StepStatus::Stopped);
}

#[test]
fn unrecognized_native_fails_closed_to_stopped() {
    assert_eq!(to_canonical("SOME_FUTURE_STATE"), StepStatus::Stopped);
    assert_eq!(to_canonical(""), StepStatus::Stopped);
    assert_eq!(to_canonical("running"), StepStatus::Stopped, "translation is case-sensitive");
}

#[test]
fn single_token_combines_to_itself() {
    assert_eq!(combine_for_output("RUNNING"), "RUNNING");
    assert_eq!(combine_for_stopping("PENDING"), "PENDING");
    // Even an unknown single token passes through untouched; translation
    // deals with it later.
    assert_eq!(combine_for_output("WEIRD"), "WEIRD");
}

#[test]
fn output_combination_favours_failure_first() {
    assert_eq!(combine_for_output("RUNNING FAILED PENDING"), "FAILED");
    assert_eq!(combine_for_output("COMPLETED TIMEOUT"), "TIMEOUT");
}

#[test]
fn output_combination_precedence_chain() {
    assert_eq!(combine_for_output("RUNNING REQUEUE_HOLD"), "REQUEUE_HOLD");
    assert_eq!(combine_for_output("RUNNING PENDING"), "PENDING");
    assert_eq!(combine_for_output("RUNNING RESIZING"), "RESIZING");
    assert_eq!(combine_for_output("COMPLETING RUNNING"), "RUNNING");
    assert_eq!(combine_for_output("COMPLETED COMPLETING"), "COMPLETING");
}

#[test]
fn output_combination_of_all_stopped_components() {
    assert_eq!(combine_for_output("COMPLETED CANCELLED PREEMPTED"), "STOPPED");
}

#[test]
fn stopping_combination_picks_any_cancellable_component() {
    assert_eq!(combine_for_stopping("COMPLETED RUNNING"), "RUNNING");
    assert_eq!(combine_for_stopping("CANCELLED SUSPENDED"), "SUSPENDED");
    assert_eq!(combine_for_stopping("COMPLETED CANCELLED"), "STOPPED");
}
