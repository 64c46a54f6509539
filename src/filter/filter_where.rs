use super::types::{FilterWhereInfo, SqlParam};

/// Renders conditions as `AND`-joined predicates with `$n` placeholders.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// `qualifier` prefixes each column with a table name, for statements
    /// that join a second relation.
    pub fn generate(
        conditions: &[FilterWhereInfo],
        starting_param_index: usize,
        qualifier: Option<&str>,
    ) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let prefix = qualifier.map(|t| format!("\"{}\".", t)).unwrap_or_default();
        let sql = conditions
            .iter()
            .map(|c| {
                let placeholder = filter_where.param(c.data.clone());
                format!("{}\"{}\" {} {}", prefix, c.column, c.operator.to_sql(), placeholder)
            })
            .collect::<Vec<_>>();

        let where_clause = if sql.is_empty() { String::new() } else { sql.join(" AND ") };
        (where_clause, filter_where.param_values)
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
