#![forbid(unsafe_code)]

mod indexes;
mod jobs;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(jobs::SQL);
    sql.push_str(indexes::SQL);
    sql
}
