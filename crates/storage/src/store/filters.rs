#![forbid(unsafe_code)]

use super::query::Select;
use cm_core::filter::{FloatRange, IntRange, JobFilter, StringInput, TimeRange};
use rusqlite::types::Value;

/// Adds every predicate set in `filter` to `select`, conjunctively.
pub fn apply_filter(mut select: Select, filter: &JobFilter) -> Select {
    if let Some(input) = &filter.job_id {
        select = string_input(select, "job.job_id", input);
    }
    if let Some(array_job_id) = filter.array_job_id {
        select = select.where_eq("job.array_job_id", array_job_id);
    }
    if let Some(input) = &filter.user {
        select = string_input(select, "job.user", input);
    }
    if let Some(input) = &filter.project {
        select = string_input(select, "job.project", input);
    }
    if let Some(input) = &filter.cluster {
        select = string_input(select, "job.cluster", input);
    }
    if let Some(input) = &filter.partition {
        select = string_input(select, "job.\"partition\"", input);
    }
    if let Some(range) = filter.duration {
        select = int_range(select, "job.duration", range);
    }
    if let Some(range) = filter.start_time {
        select = time_range(select, range);
    }
    if !filter.states.is_empty() {
        let placeholders = vec!["?"; filter.states.len()].join(", ");
        let params = filter
            .states
            .iter()
            .map(|state| Value::Text(state.as_str().to_string()))
            .collect();
        select = select.where_expr(format!("job.job_state IN ({placeholders})"), params);
    }
    if let Some(range) = filter.num_nodes {
        select = int_range(select, "job.num_nodes", range);
    }
    if let Some(range) = filter.num_hwthreads {
        select = int_range(select, "job.num_hwthreads", range);
    }
    if let Some(range) = filter.num_accelerators {
        select = int_range(select, "job.num_acc", range);
    }
    if let Some(range) = filter.flops_any_avg {
        select = float_range(select, "job.flops_any_avg", range);
    }
    if let Some(range) = filter.mem_bw_avg {
        select = float_range(select, "job.mem_bw_avg", range);
    }
    if let Some(range) = filter.load_avg {
        select = float_range(select, "job.load_avg", range);
    }
    if let Some(range) = filter.mem_used_max {
        select = float_range(select, "job.mem_used_max", range);
    }
    select
}

fn string_input(mut select: Select, column: &'static str, input: &StringInput) -> Select {
    if let Some(eq) = &input.eq {
        select = select.where_eq(column, eq.clone());
    }
    if let Some(contains) = &input.contains {
        select = like(select, column, format!("%{}%", escape_like(contains)));
    }
    if let Some(prefix) = &input.starts_with {
        select = like(select, column, format!("{}%", escape_like(prefix)));
    }
    if let Some(suffix) = &input.ends_with {
        select = like(select, column, format!("%{}", escape_like(suffix)));
    }
    select
}

fn like(select: Select, column: &'static str, pattern: String) -> Select {
    select.where_expr(
        format!("{column} LIKE ? ESCAPE '\\'"),
        vec![Value::Text(pattern)],
    )
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn int_range(select: Select, column: &'static str, range: IntRange) -> Select {
    select.where_expr(
        format!("{column} BETWEEN ? AND ?"),
        vec![Value::Integer(range.from), Value::Integer(range.to)],
    )
}

fn float_range(select: Select, column: &'static str, range: FloatRange) -> Select {
    select.where_expr(
        format!("{column} BETWEEN ? AND ?"),
        vec![Value::Real(range.from), Value::Real(range.to)],
    )
}

fn time_range(mut select: Select, range: TimeRange) -> Select {
    if let Some(from) = range.from {
        select = select.where_expr("job.start_time >= ?", vec![Value::Integer(from)]);
    }
    if let Some(to) = range.to {
        select = select.where_expr("job.start_time <= ?", vec![Value::Integer(to)]);
    }
    select
}
