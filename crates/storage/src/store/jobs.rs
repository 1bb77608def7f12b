#![forbid(unsafe_code)]

use super::*;
use cm_core::job::{JobMeta, JobStatistics};
use tracing::{debug, info, warn};

mod lookup;
mod search;

/// Metric key -> summary column written by `archive`, and which statistic
/// of the metric lands there. The column names are part of the table
/// contract.
const ARCHIVE_COLUMNS: [(&str, &str, fn(&JobStatistics) -> f64); 6] = [
    ("flops_any", "flops_any_avg", avg),
    ("mem_used", "mem_used_max", max),
    ("mem_bw", "mem_bw_avg", avg),
    ("load", "load_avg", avg),
    ("net_bw", "net_bw_avg", avg),
    ("file_bw", "file_bw_avg", avg),
];

fn avg(stats: &JobStatistics) -> f64 {
    stats.avg
}

fn max(stats: &JobStatistics) -> f64 {
    stats.max
}

fn archive_column(metric: &str) -> Option<(&'static str, fn(&JobStatistics) -> f64)> {
    ARCHIVE_COLUMNS
        .iter()
        .find(|(key, _, _)| *key == metric)
        .map(|(_, column, pick)| (*column, *pick))
}

impl JobRepository {
    /// Inserts a new job and returns its surrogate id. Metric summaries are
    /// not written here.
    pub fn start(&self, job: &JobMeta) -> Result<i64, StoreError> {
        let resources = codec::encode_resources(&job.resources)?;

        let stmt = Insert::table("job")
            .value("job_id", job.job_id)
            .value("user", job.user.clone())
            .value("project", job.project.clone())
            .value("cluster", job.cluster.clone())
            .value("\"partition\"", job.partition.clone())
            .value("array_job_id", job.array_job_id)
            .value("num_nodes", job.num_nodes)
            .value("num_hwthreads", job.num_hwthreads)
            .value("num_acc", job.num_acc)
            .value("exclusive", job.exclusive)
            .value("monitoring_status", job.monitoring_status)
            .value("smt", job.smt)
            .value("job_state", job.state.as_str().to_string())
            .value("start_time", job.start_time)
            .value("duration", job.duration)
            .value("resources", resources)
            .value("meta_data", job.meta_data.clone())
            .build();

        let id = self.cache.insert(&stmt)?;
        info!(
            id,
            job_id = job.job_id,
            cluster = %job.cluster,
            start_time = job.start_time,
            "job started"
        );
        Ok(id)
    }

    /// Sets `monitoring_status` on the job with surrogate id `id`. Returns
    /// the number of rows changed; zero is not an error.
    pub fn update_monitoring_status(
        &self,
        id: i64,
        monitoring_status: i32,
    ) -> Result<usize, StoreError> {
        let stmt = Update::table("job")
            .set("monitoring_status", monitoring_status)
            .where_eq("job.id", id)
            .build();

        let affected = self.cache.exec(&stmt)?;
        if affected == 0 {
            warn!(id, "monitoring status update matched no job");
        }
        Ok(affected)
    }

    /// Records the final state and duration of a job. Returns the number of
    /// rows changed; zero is not an error.
    pub fn stop(&self, request: JobStopRequest) -> Result<usize, StoreError> {
        let stmt = Update::table("job")
            .set("job_state", request.state.as_str().to_string())
            .set("duration", request.duration)
            .set("monitoring_status", request.monitoring_status)
            .where_eq("job.id", request.id)
            .build();

        let affected = self.cache.exec(&stmt)?;
        if affected == 0 {
            warn!(id = request.id, "stop matched no job");
        } else {
            info!(
                id = request.id,
                state = %request.state,
                duration = request.duration,
                "job stopped"
            );
        }
        Ok(affected)
    }

    /// Writes the monitoring status plus one summary column per known metric
    /// in `request.statistics`. Metrics without a summary column are skipped.
    pub fn archive(&self, request: JobArchiveRequest) -> Result<usize, StoreError> {
        let mut update = Update::table("job").set("monitoring_status", request.monitoring_status);

        for (metric, stats) in &request.statistics {
            match archive_column(metric) {
                Some((column, pick)) => update = update.set(column, pick(stats)),
                None => debug!(id = request.id, metric = %metric, "no summary column for metric"),
            }
        }

        let summaries = update.set_count() - 1;
        let stmt = update.where_eq("job.id", request.id).build();

        let affected = self.cache.exec(&stmt)?;
        if affected == 0 {
            warn!(id = request.id, "archive matched no job");
        } else {
            info!(id = request.id, summaries, "job archived");
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_columns_cover_known_metrics_only() {
        let stats = JobStatistics {
            avg: 1.5,
            min: 0.5,
            max: 9.0,
        };

        let (column, pick) = archive_column("mem_used").expect("mem_used is persisted");
        assert_eq!(column, "mem_used_max");
        assert_eq!(pick(&stats), 9.0);

        let (column, pick) = archive_column("flops_any").expect("flops_any is persisted");
        assert_eq!(column, "flops_any_avg");
        assert_eq!(pick(&stats), 1.5);

        assert!(archive_column("cpu_power").is_none());
        assert!(archive_column("FLOPS_ANY").is_none());
    }
}
