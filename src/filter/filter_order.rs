use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"created_at desc, name"` style order strings. Direction defaults
    /// to ascending.
    pub fn validate_and_parse(order: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in order.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let Some(column) = it.next() else { continue };
            validate_identifier(column).map_err(|_| FilterError::InvalidColumn(column.to_string()))?;

            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(dir) => return Err(FilterError::InvalidOrder(format!("unknown direction '{}'", dir))),
            };
            if it.next().is_some() {
                return Err(FilterError::InvalidOrder(trimmed.to_string()));
            }
            out.push(FilterOrderInfo { column: column.to_string(), sort });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_directions() {
        let infos = FilterOrder::validate_and_parse("created_at desc, name").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].sort, SortDirection::Desc);
        assert_eq!(infos[1].column, "name");
        assert_eq!(infos[1].sort, SortDirection::Asc);
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"created_at\" DESC, \"name\" ASC");
    }

    #[test]
    fn rejects_injection() {
        assert!(FilterOrder::validate_and_parse("name; drop table brokers").is_err());
        assert!(FilterOrder::validate_and_parse("name sideways").is_err());
    }
}
