//! Buffer-report parsing.
//!
//! The scheduler reports buffer state as `Key=Value` space-separated,
//! case-sensitive tokens in one of two formats. Both are handled by the
//! same line scan; only what makes a line eligible differs.
//!
//! Verbose (`show burst`):
//!
//! ```text
//! Name=bull_sbb DefaultPool=(null) Granularity=1 TotalSpace=180MiB ...
//!   Flags=EnablePersistent
//!   Allocated Buffers:
//!     Name=lqcd-sbb1 CreateTime=2023-02-08T17:42:13 Size=20MiB State=staged-in UserID=derbeyn(10579)
//! ```
//!
//! Compact (`show bbstat`):
//!
//! ```text
//! FA: BB Type=GBF bbid=3589 Name=myPersistentBB State=staged-out CreateTime=2023-09-12T13:26:57
//! FA: Total storage : 450GiB
//! ```

use stagehand_protocols::status::ServiceStatus;

/// What makes a report line eligible for buffer matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker {
    /// Lines become eligible after one containing this marker was seen.
    HeaderLine(&'static str),
    /// A line is eligible iff it starts with this prefix.
    LinePrefix(&'static str),
}

/// Marker for the verbose report: the buffer listing section starts at the
/// `Allocated Buffers` line.
pub const VERBOSE_MARKER: SectionMarker = SectionMarker::HeaderLine("Allocated Buffers");

/// Marker for the compact report: every buffer line carries this prefix.
pub const COMPACT_MARKER: SectionMarker = SectionMarker::LinePrefix("FA: BB ");

/// Scan a report for the `State=` of the buffer named `name`.
///
/// The name must match an exact space-delimited `Name=<name>` token; a
/// buffer called `bb1` never matches a line about `bb10`. Returns `None`
/// when no eligible line mentions the buffer.
fn buffer_state<'a>(output: &'a str, name: &str, marker: SectionMarker) -> Option<&'a str> {
    let wanted = format!("Name={name}");
    let mut in_section = false;

    for line in output.lines() {
        let eligible = match marker {
            SectionMarker::HeaderLine(header) => {
                if line.contains(header) {
                    in_section = true;
                }
                in_section
            }
            SectionMarker::LinePrefix(prefix) => line.starts_with(prefix),
        };
        if !eligible {
            continue;
        }
        if !line.split_whitespace().any(|token| token == wanted) {
            continue;
        }
        for token in line.split_whitespace() {
            if let Some(state) = token.strip_prefix("State=") {
                return Some(state);
            }
        }
    }
    None
}

/// Translate a raw `State=` value into a service status.
///
/// The staged transitions get explicit names; everything else goes through
/// a direct enum lookup on the uppercased, hyphen-stripped token. A value
/// that matches nothing is `Unknown`.
fn translate_state(state: &str) -> ServiceStatus {
    match state {
        "staged-in" => ServiceStatus::Allocated,
        "staged-out" => ServiceStatus::Stopped,
        "staging-out" => ServiceStatus::Stopping,
        other => {
            let normalized = other.replace('-', "").to_uppercase();
            ServiceStatus::parse(&normalized).unwrap_or(ServiceStatus::Unknown)
        }
    }
}

/// Resolve the status of the buffer named `name` from a report.
///
/// A buffer absent from the report has aged out of the scheduler's memory
/// and is deliberately read as `Stopped` (assume torn down), not `Unknown`.
pub fn buffer_status_from_report(output: &str, name: &str, marker: SectionMarker) -> ServiceStatus {
    match buffer_state(output, name, marker) {
        Some(state) => translate_state(state),
        None => ServiceStatus::Stopped,
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
