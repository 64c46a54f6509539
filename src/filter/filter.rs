use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOp, FilterOrderInfo, FilterWhereInfo, SqlParam, SqlResult};

/// Builder for single-table statements over a validated table name. Rows are
/// selected as one `row_to_json` column named `row`.
pub struct Filter {
    table_name: String,
    conditions: Vec<FilterWhereInfo>,
    order_data: Vec<FilterOrderInfo>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(|_| FilterError::InvalidTableName(table_name.clone()))?;
        Ok(Self {
            table_name,
            conditions: vec![],
            order_data: vec![],
        })
    }

    pub fn where_eq(&mut self, column: &str, value: SqlParam) -> Result<&mut Self, FilterError> {
        self.condition(column, FilterOp::Eq, value)
    }

    fn condition(&mut self, column: &str, operator: FilterOp, data: SqlParam) -> Result<&mut Self, FilterError> {
        validate_identifier(column)?;
        self.conditions.push(FilterWhereInfo { column: column.to_string(), operator, data });
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &str) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(order_spec)?;
        Ok(self)
    }

    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0, None);
        let query = [
            format!("SELECT row_to_json(\"{0}\".*) AS row FROM \"{0}\"", self.table_name),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            FilterOrder::generate(&self.order_data),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_delete_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0, None);
        let query = if where_clause.is_empty() {
            format!("DELETE FROM \"{}\"", self.table_name)
        } else {
            format!("DELETE FROM \"{}\" WHERE {}", self.table_name, where_clause)
        };
        SqlResult { query, params }
    }

    /// `INSERT` of the given columns, read from a jsonb parameter so columns
    /// absent from the payload keep their table defaults.
    pub fn to_insert_sql(&self, columns: &[String], payload: SqlParam) -> Result<SqlResult, FilterError> {
        for column in columns {
            validate_identifier(column)?;
        }
        let list = quoted_list(columns);
        let query = format!(
            "INSERT INTO \"{0}\" ({1}) SELECT {1} FROM jsonb_populate_record(NULL::\"{0}\", $1::jsonb) RETURNING row_to_json(\"{0}\".*) AS row",
            self.table_name, list
        );
        Ok(SqlResult { query, params: vec![payload] })
    }

    /// `UPDATE` of the given columns from a jsonb parameter, filtered by the
    /// builder's conditions. `updated_at` is always refreshed.
    pub fn to_update_sql(&self, columns: &[String], payload: SqlParam) -> Result<SqlResult, FilterError> {
        for column in columns {
            validate_identifier(column)?;
        }
        let mut assignments: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{0}\" = r.\"{0}\"", c))
            .collect();
        assignments.push("\"updated_at\" = now()".to_string());

        let (where_clause, mut params) = FilterWhere::generate(&self.conditions, 1, Some(&self.table_name));
        params.insert(0, payload);

        let query = format!(
            "UPDATE \"{0}\" SET {1} FROM jsonb_populate_record(NULL::\"{0}\", $1::jsonb) AS r{2} RETURNING row_to_json(\"{0}\".*) AS row",
            self.table_name,
            assignments.join(", "),
            if where_clause.is_empty() { String::new() } else { format!(" WHERE {}", where_clause) }
        );
        Ok(SqlResult { query, params })
    }
}

fn quoted_list(columns: &[String]) -> String {
    columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", ")
}

/// Identifiers are limited to `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn select_with_condition_and_order() {
        let id = Uuid::new_v4();
        let mut filter = Filter::new("application_documents").unwrap();
        filter.where_eq("application_id", SqlParam::Uuid(id)).unwrap();
        filter.order("created_at desc").unwrap();

        let sql = filter.to_sql();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(\"application_documents\".*) AS row FROM \"application_documents\" \
             WHERE \"application_id\" = $1 ORDER BY \"created_at\" DESC"
        );
        assert_eq!(sql.params, vec![SqlParam::Uuid(id)]);
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert!(Filter::new("clients; drop").is_err());
        assert!(Filter::new("").is_err());
        let mut filter = Filter::new("clients").unwrap();
        assert!(filter.where_eq("1id", SqlParam::Bool(true)).is_err());
    }

    #[test]
    fn insert_lists_only_given_columns() {
        let filter = Filter::new("clients").unwrap();
        let sql = filter
            .to_insert_sql(&["full_name".into(), "broker_id".into()], SqlParam::Json(json!({})))
            .unwrap();
        assert!(sql.query.starts_with("INSERT INTO \"clients\" (\"full_name\", \"broker_id\") SELECT \"full_name\", \"broker_id\""));
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn update_placeholders_follow_payload() {
        let id = Uuid::new_v4();
        let mut filter = Filter::new("lenders").unwrap();
        filter.where_eq("id", SqlParam::Uuid(id)).unwrap();
        let sql = filter.to_update_sql(&["name".into()], SqlParam::Json(json!({"name": "x"}))).unwrap();

        assert!(sql.query.contains("SET \"name\" = r.\"name\", \"updated_at\" = now()"));
        assert!(sql.query.contains("WHERE \"lenders\".\"id\" = $2"));
        assert_eq!(sql.params[1], SqlParam::Uuid(id));
    }
}
