#![forbid(unsafe_code)]

use super::StoreError;
use cm_core::job::{Job, JobState, Resource};
use rusqlite::Row;
use time::OffsetDateTime;

/// Projection read by every job lookup. `decode_job` depends on this order.
pub const JOB_COLUMNS: [&str; 18] = [
    "job.id",
    "job.job_id",
    "job.user",
    "job.project",
    "job.cluster",
    "job.start_time",
    "job.\"partition\"",
    "job.array_job_id",
    "job.num_nodes",
    "job.num_hwthreads",
    "job.num_acc",
    "job.exclusive",
    "job.monitoring_status",
    "job.smt",
    "job.job_state",
    "job.duration",
    "job.resources",
    "job.meta_data",
];

/// Builds a [`Job`] from a row selected with [`JOB_COLUMNS`].
///
/// The resource list is decoded here and the encoded text is dropped; a
/// running job without a persisted duration gets `now_unix - start_time`.
pub(in crate::store) fn decode_job(row: &Row<'_>, now_unix: i64) -> Result<Job, StoreError> {
    let start_time_unix: i64 = row.get(5)?;
    let raw_state: String = row.get(14)?;
    let raw_resources: String = row.get(16)?;

    let state = raw_state
        .parse::<JobState>()
        .map_err(|err| StoreError::Decode {
            column: "job_state",
            message: err.to_string(),
        })?;
    let resources = decode_resources(&raw_resources)?;
    let start_time =
        OffsetDateTime::from_unix_timestamp(start_time_unix).map_err(|err| StoreError::Decode {
            column: "start_time",
            message: err.to_string(),
        })?;

    let mut job = Job {
        id: row.get(0)?,
        job_id: row.get(1)?,
        user: row.get(2)?,
        project: row.get(3)?,
        cluster: row.get(4)?,
        start_time,
        start_time_unix,
        partition: row.get(6)?,
        array_job_id: row.get(7)?,
        num_nodes: row.get(8)?,
        num_hwthreads: row.get(9)?,
        num_acc: row.get(10)?,
        exclusive: row.get(11)?,
        monitoring_status: row.get(12)?,
        smt: row.get(13)?,
        state,
        duration: row.get(15)?,
        resources,
        meta_data: row.get(17)?,
    };

    if Job::has_derived_duration(job.state, job.duration) {
        job.duration = job.elapsed_since_start(now_unix);
    }

    Ok(job)
}

pub(in crate::store) fn decode_resources(raw: &str) -> Result<Vec<Resource>, StoreError> {
    serde_json::from_str(raw).map_err(|err| StoreError::Decode {
        column: "resources",
        message: err.to_string(),
    })
}

pub(in crate::store) fn encode_resources(resources: &[Resource]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(resources)?)
}
