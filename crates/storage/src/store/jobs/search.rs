#![forbid(unsafe_code)]

use super::*;
use cm_core::auth::{Caller, sees_all_jobs};

impl JobRepository {
    /// Resolves a free-text search term to a job or a username.
    ///
    /// A numeric term is tried as a scheduler job id first (within the
    /// caller's scope) and wins over a username spelled the same way. Only
    /// admins and internal calls may resolve usernames. Every miss, including
    /// a forbidden username lookup, is the same [`StoreError::NotFound`].
    pub fn find_job_or_user(
        &self,
        term: &str,
        caller: Option<&Caller>,
    ) -> Result<JobOrUser, StoreError> {
        if let Ok(job_id) = term.parse::<i64>() {
            let select = scope_to_caller(
                Select::new(&["job.id"]).where_eq("job.job_id", job_id),
                caller,
            );
            if let Some(id) = self
                .cache
                .query_row(&select.build(), |row| Ok(row.get::<_, i64>(0)?))?
            {
                return Ok(JobOrUser::Job(id));
            }
        }

        if sees_all_jobs(caller) {
            let select = Select::new(&["job.user"])
                .distinct()
                .where_eq("job.user", term.to_string());
            if let Some(username) = self
                .cache
                .query_row(&select.build(), |row| Ok(row.get::<_, String>(0)?))?
            {
                return Ok(JobOrUser::User(username));
            }
        }

        Err(StoreError::NotFound)
    }
}
