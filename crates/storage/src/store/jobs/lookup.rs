#![forbid(unsafe_code)]

use super::*;
use cm_core::auth::Caller;
use cm_core::filter::Aggregate;
use cm_core::job::Job;

impl JobRepository {
    /// Finds a job by scheduler job id, optionally narrowed by cluster and
    /// start time. The scheduler id alone is not unique, so without the
    /// narrowing columns any one of several matches may be returned.
    pub fn find(&self, request: &JobFindRequest) -> Result<Job, StoreError> {
        let mut select = Select::new(&JOB_COLUMNS).where_eq("job.job_id", request.job_id);
        if let Some(cluster) = &request.cluster {
            select = select.where_eq("job.cluster", cluster.clone());
        }
        if let Some(start_time) = request.start_time {
            select = select.where_eq("job.start_time", start_time);
        }

        self.query_one_job(select)
    }

    /// Finds a job by its surrogate id.
    pub fn find_by_id(&self, id: i64) -> Result<Job, StoreError> {
        self.query_one_job(Select::new(&JOB_COLUMNS).where_eq("job.id", id))
    }

    /// Counts jobs per value of `request.aggregate`, largest groups first.
    ///
    /// The aggregate is checked against the allow-list before anything is
    /// built, and the caller's scope is applied before the filters.
    pub fn count_grouped_jobs(
        &self,
        request: &CountGroupedJobsRequest,
        caller: Option<&Caller>,
    ) -> Result<Vec<GroupCount>, StoreError> {
        let aggregate = Aggregate::parse(&request.aggregate)?;
        let column = aggregate.column();

        let mut select = scope_to_caller(Select::new(&[column, "count(*) AS count"]), caller);
        for filter in &request.filters {
            select = apply_filter(select, filter);
        }
        select = select.group_by(column).order_by("count DESC").order_by(column);
        if let Some(limit) = request.limit {
            select = select.limit(limit);
        }

        self.cache.query_all(&select.build(), |row| {
            Ok(GroupCount {
                group: row.get(0)?,
                count: row.get(1)?,
            })
        })
    }

    fn query_one_job(&self, select: Select) -> Result<Job, StoreError> {
        let now = support::now_unix();
        self.cache
            .query_row(&select.build(), |row| codec::decode_job(row, now))?
            .ok_or(StoreError::NotFound)
    }
}
