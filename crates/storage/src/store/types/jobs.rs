#![forbid(unsafe_code)]

use cm_core::filter::JobFilter;
use cm_core::job::{JobState, MetricStatistics};

#[derive(Clone, Debug, PartialEq)]
pub struct JobStopRequest {
    pub id: i64,
    pub duration: i32,
    pub state: JobState,
    pub monitoring_status: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobArchiveRequest {
    pub id: i64,
    pub monitoring_status: i32,
    pub statistics: MetricStatistics,
}

/// Lookup by scheduler job id. `cluster` and `start_time` narrow the match
/// when given; `None` leaves that column unconstrained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobFindRequest {
    pub job_id: i64,
    pub cluster: Option<String>,
    pub start_time: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountGroupedJobsRequest {
    pub aggregate: String,
    pub filters: Vec<JobFilter>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCount {
    pub group: String,
    pub count: i64,
}

/// What a free-text search term resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOrUser {
    Job(i64),
    User(String),
}
