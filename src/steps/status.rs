//! Step status as reported after a run.

use serde::Serialize;
use std::time::Duration;

/// Final status of a step in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step changed machine state.
    Done,
    /// Desired state already held.
    Skipped,
    /// Step returned an error.
    Failed,
    /// Step was never started.
    NotRun,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Done => '✓',
            StepStatus::Skipped => '⊘',
            StepStatus::Failed => '✗',
            StepStatus::NotRun => '○',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Done => "done",
            StepStatus::Skipped => "skipped",
            StepStatus::Failed => "failed",
            StepStatus::NotRun => "not run",
        };
        write!(f, "{}", s)
    }
}

/// Format a duration compactly: `350ms`, `4.2s`, `3m 12s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
