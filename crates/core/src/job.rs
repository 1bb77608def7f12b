#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Values of the `monitoring_status` column.
pub mod monitoring_status {
    pub const DISABLED: i32 = 0;
    pub const RUNNING_OR_ARCHIVING: i32 = 1;
    pub const ARCHIVING_FAILED: i32 = 2;
    pub const ARCHIVING_SUCCESSFUL: i32 = 3;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Cancelled,
    Stopped,
    Timeout,
    Preempted,
    OutOfMemory,
}

impl JobState {
    pub const ALL: [JobState; 8] = [
        JobState::Running,
        JobState::Completed,
        JobState::Failed,
        JobState::Cancelled,
        JobState::Stopped,
        JobState::Timeout,
        JobState::Preempted,
        JobState::OutOfMemory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
            JobState::Stopped => "stopped",
            JobState::Timeout => "timeout",
            JobState::Preempted => "preempted",
            JobState::OutOfMemory => "out_of_memory",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != JobState::Running
    }

    /// Running may move to any terminal state. A terminal state only
    /// "moves" to itself, which keeps repeated stop/archive calls legal.
    pub fn can_transition_to(self, next: JobState) -> bool {
        match self {
            JobState::Running => next.is_terminal(),
            terminal => terminal == next,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownJobState(pub String);

impl fmt::Display for UnknownJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown job state: {}", self.0)
    }
}

impl std::error::Error for UnknownJobState {}

impl FromStr for JobState {
    type Err = UnknownJobState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        JobState::ALL
            .into_iter()
            .find(|state| state.as_str() == value)
            .ok_or_else(|| UnknownJobState(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalTransition {
    pub from: JobState,
    pub to: JobState,
}

impl fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal job state transition ({} -> {})", self.from, self.to)
    }
}

impl std::error::Error for IllegalTransition {}

/// Opt-in check for callers that want to enforce lifecycle ordering before
/// issuing a stop or archive. The repository itself does not call this.
pub fn validate_transition(from: JobState, to: JobState) -> Result<(), IllegalTransition> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}

/// One allocated host and what was handed out on it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hwthreads: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
}

/// Summary of one metric over the job's runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatistics {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

pub type MetricStatistics = BTreeMap<String, JobStatistics>;

/// Everything the scheduler tells us when a job starts. This is what
/// `start` persists; metric summaries are only written at archival.
#[derive(Clone, Debug, PartialEq)]
pub struct JobMeta {
    pub job_id: i64,
    pub user: String,
    pub project: String,
    pub cluster: String,
    pub partition: String,
    pub array_job_id: i64,
    pub num_nodes: i32,
    pub num_hwthreads: i32,
    pub num_acc: i32,
    pub exclusive: i32,
    pub monitoring_status: i32,
    pub smt: i32,
    pub state: JobState,
    pub start_time: i64,
    pub duration: i32,
    pub resources: Vec<Resource>,
    pub meta_data: Option<String>,
}

/// A stored job as returned by the repository.
///
/// `id` is the surrogate key assigned on insert; `job_id` is the scheduler's
/// id and is only unique together with `cluster` and `start_time`.
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    pub id: i64,
    pub job_id: i64,
    pub user: String,
    pub project: String,
    pub cluster: String,
    pub partition: String,
    pub array_job_id: i64,
    pub num_nodes: i32,
    pub num_hwthreads: i32,
    pub num_acc: i32,
    pub exclusive: i32,
    pub monitoring_status: i32,
    pub smt: i32,
    pub state: JobState,
    pub start_time: OffsetDateTime,
    pub start_time_unix: i64,
    pub duration: i32,
    pub resources: Vec<Resource>,
    pub meta_data: Option<String>,
}

impl Job {
    /// Seconds elapsed between `start_time_unix` and `now_unix`, clamped to
    /// the `duration` column's range. A start time in the future yields 0,
    /// never a negative duration.
    pub fn elapsed_since_start(&self, now_unix: i64) -> i32 {
        let elapsed = now_unix.saturating_sub(self.start_time_unix).max(0);
        i32::try_from(elapsed).unwrap_or(i32::MAX)
    }

    /// A running job with no persisted duration reports its live runtime.
    pub fn has_derived_duration(state: JobState, persisted_duration: i32) -> bool {
        persisted_duration == 0 && state == JobState::Running
    }
}
