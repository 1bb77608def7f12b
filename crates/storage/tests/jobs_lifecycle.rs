#![forbid(unsafe_code)]

use cm_core::job::{JobMeta, JobState, JobStatistics, MetricStatistics, Resource, monitoring_status};
use cm_storage::{JobArchiveRequest, JobRepository, JobStopRequest, RepositoryConfig, StoreError};
use rusqlite::{Connection, params};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_storage_dir(label: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be monotonic enough for tests")
        .as_nanos();
    path.push(format!("cm-storage-{label}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("temp storage dir must be creatable");
    path
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

fn job_meta(job_id: i64, user: &str, cluster: &str, start_time: i64) -> JobMeta {
    JobMeta {
        job_id,
        user: user.to_string(),
        project: "proj-x".to_string(),
        cluster: cluster.to_string(),
        partition: "main".to_string(),
        array_job_id: 0,
        num_nodes: 2,
        num_hwthreads: 144,
        num_acc: 1,
        exclusive: 1,
        monitoring_status: monitoring_status::RUNNING_OR_ARCHIVING,
        smt: 1,
        state: JobState::Running,
        start_time,
        duration: 0,
        resources: vec![
            Resource {
                hostname: "n001".to_string(),
                hwthreads: Some((0..72).collect()),
                accelerators: Some(vec!["gpu0".to_string()]),
                configuration: None,
            },
            Resource {
                hostname: "n002".to_string(),
                hwthreads: Some((0..72).collect()),
                accelerators: None,
                configuration: Some("default".to_string()),
            },
        ],
        meta_data: Some(r#"{"jobName":"lammps"}"#.to_string()),
    }
}

fn stats(avg: f64, max: f64) -> JobStatistics {
    JobStatistics { avg, min: 0.0, max }
}

#[test]
fn start_then_find_by_id_round_trips_every_field() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");
    let mut meta = job_meta(4242, "alice", "fritz", 1_700_000_000);
    meta.duration = 3_600;
    meta.state = JobState::Completed;

    let id = repo.start(&meta).expect("start job");
    let job = repo.find_by_id(id).expect("job must exist");

    assert_eq!(job.id, id);
    assert_eq!(job.job_id, meta.job_id);
    assert_eq!(job.user, meta.user);
    assert_eq!(job.project, meta.project);
    assert_eq!(job.cluster, meta.cluster);
    assert_eq!(job.partition, meta.partition);
    assert_eq!(job.array_job_id, meta.array_job_id);
    assert_eq!(job.num_nodes, meta.num_nodes);
    assert_eq!(job.num_hwthreads, meta.num_hwthreads);
    assert_eq!(job.num_acc, meta.num_acc);
    assert_eq!(job.exclusive, meta.exclusive);
    assert_eq!(job.monitoring_status, meta.monitoring_status);
    assert_eq!(job.smt, meta.smt);
    assert_eq!(job.state, meta.state);
    assert_eq!(job.start_time_unix, meta.start_time);
    assert_eq!(job.start_time.unix_timestamp(), meta.start_time);
    assert_eq!(job.duration, 3_600);
    assert_eq!(job.resources, meta.resources);
    assert_eq!(job.meta_data, meta.meta_data);
}

#[test]
fn surrogate_ids_are_distinct_and_increasing() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");
    let first = repo
        .start(&job_meta(1, "alice", "fritz", 1_000))
        .expect("first job");
    let second = repo
        .start(&job_meta(1, "alice", "fritz", 2_000))
        .expect("resubmission with new start time");
    assert!(second > first);
}

#[test]
fn duplicate_job_triple_is_a_store_error() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");
    repo.start(&job_meta(7, "alice", "fritz", 1_000))
        .expect("first insert");

    let err = repo
        .start(&job_meta(7, "bob", "fritz", 1_000))
        .expect_err("same job id, cluster and start time must be rejected");
    assert!(matches!(err, StoreError::Sql(_)));
    assert_eq!(err.code(), "SQL");
}

#[test]
fn running_job_without_duration_reports_elapsed_time_without_persisting_it() {
    let dir = temp_storage_dir("derived-duration");
    let config = RepositoryConfig::default();
    let repo = JobRepository::open(&dir, &config).expect("open store");

    let started = now_unix() - 100;
    let id = repo
        .start(&job_meta(99, "alice", "fritz", started))
        .expect("start job");

    let job = repo.find_by_id(id).expect("job must exist");
    assert!(
        (100..=105).contains(&job.duration),
        "derived duration {} should be ~100s",
        job.duration
    );

    let conn = Connection::open(dir.join(&config.db_file_name)).expect("raw connection");
    let stored: i32 = conn
        .query_row("SELECT duration FROM job WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .expect("stored duration");
    assert_eq!(stored, 0);
}

#[test]
fn persisted_duration_is_returned_unchanged() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");

    let mut running = job_meta(1, "alice", "fritz", now_unix() - 500);
    running.duration = 42;
    let running_id = repo.start(&running).expect("running job");

    let mut failed = job_meta(2, "alice", "fritz", now_unix() - 500);
    failed.state = JobState::Failed;
    let failed_id = repo.start(&failed).expect("failed job");

    assert_eq!(repo.find_by_id(running_id).expect("running").duration, 42);
    assert_eq!(repo.find_by_id(failed_id).expect("failed").duration, 0);
}

#[test]
fn stop_updates_state_duration_and_monitoring_status() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");
    let id = repo
        .start(&job_meta(5, "alice", "fritz", 1_000))
        .expect("start job");

    let affected = repo
        .stop(JobStopRequest {
            id,
            duration: 720,
            state: JobState::Timeout,
            monitoring_status: monitoring_status::ARCHIVING_SUCCESSFUL,
        })
        .expect("stop job");
    assert_eq!(affected, 1);

    let job = repo.find_by_id(id).expect("job must exist");
    assert_eq!(job.state, JobState::Timeout);
    assert_eq!(job.duration, 720);
    assert_eq!(job.monitoring_status, monitoring_status::ARCHIVING_SUCCESSFUL);
}

#[test]
fn updates_on_missing_rows_report_zero_rows_without_failing() {
    init_tracing();
    let repo = JobRepository::open_in_memory().expect("in-memory store");

    let stopped = repo
        .stop(JobStopRequest {
            id: 12345,
            duration: 1,
            state: JobState::Completed,
            monitoring_status: monitoring_status::DISABLED,
        })
        .expect("stop on missing row is not an error");
    assert_eq!(stopped, 0);

    let updated = repo
        .update_monitoring_status(12345, monitoring_status::ARCHIVING_FAILED)
        .expect("status update on missing row is not an error");
    assert_eq!(updated, 0);

    let archived = repo
        .archive(JobArchiveRequest {
            id: 12345,
            monitoring_status: monitoring_status::ARCHIVING_SUCCESSFUL,
            statistics: MetricStatistics::new(),
        })
        .expect("archive on missing row is not an error");
    assert_eq!(archived, 0);
}

#[test]
fn update_monitoring_status_touches_only_that_column() {
    let repo = JobRepository::open_in_memory().expect("in-memory store");
    let id = repo
        .start(&job_meta(6, "alice", "fritz", 1_000))
        .expect("start job");
    let before = repo.find_by_id(id).expect("job must exist");

    repo.update_monitoring_status(id, monitoring_status::ARCHIVING_FAILED)
        .expect("update status");

    let after = repo.find_by_id(id).expect("job must exist");
    assert_eq!(after.monitoring_status, monitoring_status::ARCHIVING_FAILED);
    assert_eq!(after.state, before.state);
    assert_eq!(after.resources, before.resources);
}

#[test]
fn archive_writes_known_metric_columns_and_ignores_unknown_keys() {
    init_tracing();
    let dir = temp_storage_dir("archive");
    let config = RepositoryConfig::default();
    let repo = JobRepository::open(&dir, &config).expect("open store");
    let id = repo
        .start(&job_meta(8, "alice", "fritz", 1_000))
        .expect("start job");
    repo.stop(JobStopRequest {
        id,
        duration: 60,
        state: JobState::Completed,
        monitoring_status: monitoring_status::RUNNING_OR_ARCHIVING,
    })
    .expect("stop job");

    let mut statistics = MetricStatistics::new();
    statistics.insert("flops_any".to_string(), stats(12.5, 40.0));
    statistics.insert("mem_used".to_string(), stats(3.0, 96.0));
    statistics.insert("cpu_power".to_string(), stats(250.0, 300.0));

    let affected = repo
        .archive(JobArchiveRequest {
            id,
            monitoring_status: monitoring_status::ARCHIVING_SUCCESSFUL,
            statistics,
        })
        .expect("unknown metric keys must not abort archival");
    assert_eq!(affected, 1);

    let conn = Connection::open(dir.join(&config.db_file_name)).expect("raw connection");
    let row = conn
        .query_row(
            "SELECT monitoring_status, flops_any_avg, mem_used_max, mem_bw_avg, load_avg, net_bw_avg, file_bw_avg \
             FROM job WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                    row.get::<_, Option<f64>>(5)?,
                    row.get::<_, Option<f64>>(6)?,
                ))
            },
        )
        .expect("archived row");

    assert_eq!(
        row,
        (
            monitoring_status::ARCHIVING_SUCCESSFUL,
            Some(12.5),
            Some(96.0),
            None,
            None,
            None,
            None
        )
    );
}

#[test]
fn malformed_resources_surface_as_decode_error() {
    let dir = temp_storage_dir("decode-error");
    let config = RepositoryConfig::default();
    let repo = JobRepository::open(&dir, &config).expect("open store");
    let id = repo
        .start(&job_meta(9, "alice", "fritz", 1_000))
        .expect("start job");

    let conn = Connection::open(dir.join(&config.db_file_name)).expect("raw connection");
    conn.execute(
        "UPDATE job SET resources = ?1 WHERE id = ?2",
        params!["{not json", id],
    )
    .expect("corrupt resources");

    let err = repo.find_by_id(id).expect_err("corrupt resources must not decode");
    assert!(matches!(err, StoreError::Decode { column: "resources", .. }));
    assert_eq!(err.code(), "DECODE");
}

#[test]
fn unknown_job_state_surfaces_as_decode_error() {
    let dir = temp_storage_dir("decode-state");
    let config = RepositoryConfig::default();
    let repo = JobRepository::open(&dir, &config).expect("open store");
    let id = repo
        .start(&job_meta(10, "alice", "fritz", 1_000))
        .expect("start job");

    let conn = Connection::open(dir.join(&config.db_file_name)).expect("raw connection");
    conn.execute(
        "UPDATE job SET job_state = 'zombie' WHERE id = ?1",
        params![id],
    )
    .expect("corrupt state");

    let err = repo.find_by_id(id).expect_err("unknown state must not decode");
    assert!(matches!(err, StoreError::Decode { column: "job_state", .. }));
}

#[test]
fn config_loads_from_json_with_defaults() {
    let config = RepositoryConfig::from_json(r#"{"db_file_name":"jobs.sqlite"}"#)
        .expect("partial config");
    assert_eq!(config.db_file_name, "jobs.sqlite");
    assert_eq!(config.busy_timeout_ms, RepositoryConfig::default().busy_timeout_ms);

    let err = RepositoryConfig::from_json(r#"{"db_file_name":"  "}"#)
        .expect_err("blank file name");
    assert!(matches!(err, StoreError::InvalidInput(_)));

    let dir = temp_storage_dir("config");
    let repo = JobRepository::open(&dir, &config).expect("open with custom file");
    assert_eq!(repo.storage_dir(), Some(dir.as_path()));
    assert!(dir.join("jobs.sqlite").exists());
}
