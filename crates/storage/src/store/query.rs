#![forbid(unsafe_code)]

//! Parameterized statement builders.
//!
//! Identifiers (tables, columns, SQL fragments) are `&'static str` or come
//! from a validated allow-list; every value is a bound `?` parameter.

use rusqlite::types::Value;

/// A composed statement: SQL text plus its positional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Clone, Debug)]
struct Predicate {
    expr: String,
    params: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct Select {
    columns: Vec<&'static str>,
    from: &'static str,
    distinct: bool,
    predicates: Vec<Predicate>,
    group_by: Vec<&'static str>,
    order_by: Vec<&'static str>,
    limit: Option<u64>,
}

impl Select {
    pub fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            from: "job",
            distinct: false,
            predicates: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn from(mut self, table: &'static str) -> Self {
        self.from = table;
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// `column = ?`
    pub fn where_eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.where_expr(format!("{column} = ?"), vec![value.into()])
    }

    /// Arbitrary predicate; `expr` must contain exactly one `?` per param.
    pub fn where_expr(mut self, expr: impl Into<String>, params: Vec<Value>) -> Self {
        self.predicates.push(Predicate {
            expr: expr.into(),
            params,
        });
        self
    }

    pub fn group_by(mut self, column: &'static str) -> Self {
        self.group_by.push(column);
        self
    }

    pub fn order_by(mut self, expr: &'static str) -> Self {
        self.order_by.push(expr);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn build(self) -> Statement {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns.join(", "));
        sql.push_str(" FROM ");
        sql.push_str(self.from);

        let mut params = push_where(&mut sql, self.predicates);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        Statement { sql, params }
    }
}

#[derive(Clone, Debug)]
pub struct Update {
    table: &'static str,
    sets: Vec<(&'static str, Value)>,
    predicates: Vec<Predicate>,
}

impl Update {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            sets: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.sets.push((column, value.into()));
        self
    }

    pub fn where_eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            expr: format!("{column} = ?"),
            params: vec![value.into()],
        });
        self
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    pub fn build(self) -> Statement {
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut params = Vec::with_capacity(self.sets.len() + self.predicates.len());
        let assignments = self
            .sets
            .into_iter()
            .map(|(column, value)| {
                params.push(value);
                format!("{column} = ?")
            })
            .collect::<Vec<_>>();
        sql.push_str(&assignments.join(", "));
        params.extend(push_where(&mut sql, self.predicates));
        Statement { sql, params }
    }
}

#[derive(Clone, Debug)]
pub struct Insert {
    table: &'static str,
    values: Vec<(&'static str, Value)>,
}

impl Insert {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            values: Vec::new(),
        }
    }

    pub fn value(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn build(self) -> Statement {
        let (columns, params): (Vec<_>, Vec<_>) = self.values.into_iter().unzip();
        let placeholders = vec!["?"; columns.len()].join(", ");
        Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table,
                columns.join(", "),
                placeholders
            ),
            params,
        }
    }
}

fn push_where(sql: &mut String, predicates: Vec<Predicate>) -> Vec<Value> {
    let mut params = Vec::new();
    if predicates.is_empty() {
        return params;
    }
    let exprs = predicates
        .into_iter()
        .map(|predicate| {
            params.extend(predicate.params);
            format!("({})", predicate.expr)
        })
        .collect::<Vec<_>>();
    sql.push_str(" WHERE ");
    sql.push_str(&exprs.join(" AND "));
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_joins_predicates_conjunctively_in_order() {
        let stmt = Select::new(&["job.id", "job.user"])
            .from("job")
            .where_eq("job.job_id", 42_i64)
            .where_expr("job.duration BETWEEN ? AND ?", vec![10_i64.into(), 20_i64.into()])
            .order_by("job.id DESC")
            .limit(5)
            .build();

        assert_eq!(
            stmt.sql,
            "SELECT job.id, job.user FROM job WHERE (job.job_id = ?) AND (job.duration BETWEEN ? AND ?) ORDER BY job.id DESC LIMIT ?"
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::Integer(42),
                Value::Integer(10),
                Value::Integer(20),
                Value::Integer(5)
            ]
        );
    }

    #[test]
    fn select_distinct_with_grouping() {
        let stmt = Select::new(&["job.user", "count(*) AS count"])
            .distinct()
            .group_by("job.user")
            .order_by("count DESC")
            .build();
        assert_eq!(
            stmt.sql,
            "SELECT DISTINCT job.user, count(*) AS count FROM job GROUP BY job.user ORDER BY count DESC"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn hostile_values_never_reach_sql_text() {
        let hostile = "x' OR '1'='1";
        let stmt = Select::new(&["job.id"])
            .where_eq("job.user", hostile.to_string())
            .build();
        assert!(!stmt.sql.contains(hostile));
        assert_eq!(stmt.params, vec![Value::Text(hostile.to_string())]);
    }

    #[test]
    fn update_binds_sets_before_predicates() {
        let stmt = Update::table("job")
            .set("job_state", "completed".to_string())
            .set("duration", 60_i32)
            .where_eq("job.id", 7_i64)
            .build();
        assert_eq!(
            stmt.sql,
            "UPDATE job SET job_state = ?, duration = ? WHERE (job.id = ?)"
        );
        assert_eq!(
            stmt.params,
            vec![
                Value::Text("completed".to_string()),
                Value::Integer(60),
                Value::Integer(7)
            ]
        );
    }

    #[test]
    fn insert_lists_columns_and_placeholders() {
        let stmt = Insert::table("job")
            .value("job_id", 1_i64)
            .value("user", "alice".to_string())
            .build();
        assert_eq!(stmt.sql, "INSERT INTO job (job_id, user) VALUES (?, ?)");
        assert_eq!(stmt.params.len(), 2);
    }
}
