#![forbid(unsafe_code)]

use crate::job::JobState;
use std::fmt;

/// Text predicate. When several fields are set they are all applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringInput {
    pub eq: Option<String>,
    pub contains: Option<String>,
    pub starts_with: Option<String>,
    pub ends_with: Option<String>,
}

impl StringInput {
    pub fn eq(value: impl Into<String>) -> Self {
        Self {
            eq: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Inclusive integer range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntRange {
    pub from: i64,
    pub to: i64,
}

/// Inclusive float range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    pub from: f64,
    pub to: f64,
}

/// Start-time window in epoch seconds; either bound may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

/// One conjunctive set of job predicates. Unset fields do not constrain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobFilter {
    pub job_id: Option<StringInput>,
    pub array_job_id: Option<i64>,
    pub user: Option<StringInput>,
    pub project: Option<StringInput>,
    pub cluster: Option<StringInput>,
    pub partition: Option<StringInput>,
    pub duration: Option<IntRange>,
    pub start_time: Option<TimeRange>,
    pub states: Vec<JobState>,
    pub num_nodes: Option<IntRange>,
    pub num_hwthreads: Option<IntRange>,
    pub num_accelerators: Option<IntRange>,
    pub flops_any_avg: Option<FloatRange>,
    pub mem_bw_avg: Option<FloatRange>,
    pub load_avg: Option<FloatRange>,
    pub mem_used_max: Option<FloatRange>,
}

/// Column a grouped count may be keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    User,
    Project,
    Cluster,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregateError {
    Invalid(String),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(raw) => write!(f, "invalid aggregate: {raw}"),
        }
    }
}

impl std::error::Error for AggregateError {}

impl Aggregate {
    pub const ALL: [Aggregate; 3] = [Aggregate::User, Aggregate::Project, Aggregate::Cluster];

    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::User => "user",
            Aggregate::Project => "project",
            Aggregate::Cluster => "cluster",
        }
    }

    /// Qualified column name. This is the only identifier in a job query
    /// derived from caller input, so it must come from the allow-list.
    pub fn column(self) -> &'static str {
        match self {
            Aggregate::User => "job.user",
            Aggregate::Project => "job.project",
            Aggregate::Cluster => "job.cluster",
        }
    }

    /// Upper-case enum spelling used by API clients (`USER`, ...).
    pub fn as_enum_str(self) -> &'static str {
        match self {
            Aggregate::User => "USER",
            Aggregate::Project => "PROJECT",
            Aggregate::Cluster => "CLUSTER",
        }
    }

    /// Exact match against the allow-list, in either the column spelling
    /// (`user`) or the enum spelling (`USER`). Mixed case is rejected.
    pub fn parse(raw: &str) -> Result<Self, AggregateError> {
        Aggregate::ALL
            .into_iter()
            .find(|aggregate| aggregate.as_str() == raw || aggregate.as_enum_str() == raw)
            .ok_or_else(|| AggregateError::Invalid(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_parse_accepts_only_allow_listed_keys() {
        assert_eq!(Aggregate::parse("user"), Ok(Aggregate::User));
        assert_eq!(Aggregate::parse("cluster"), Ok(Aggregate::Cluster));
        assert_eq!(Aggregate::parse("USER"), Ok(Aggregate::User));
        assert_eq!(Aggregate::parse("PROJECT"), Ok(Aggregate::Project));
        assert_eq!(
            Aggregate::parse("User"),
            Err(AggregateError::Invalid("User".to_string()))
        );
        assert!(Aggregate::parse("user; DROP TABLE job").is_err());
        assert!(Aggregate::parse("job_state").is_err());
    }

    #[test]
    fn aggregate_columns_are_qualified() {
        for aggregate in Aggregate::ALL {
            assert_eq!(aggregate.column(), format!("job.{}", aggregate.as_str()));
        }
    }
}
