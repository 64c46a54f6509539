use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".into(), Value::Bool(true));
            response.insert("message".into(), Value::String(message.to_string()));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".into(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a JSON value as-is, or as `key: value` lines for text output
pub fn output_value(output_format: OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => match value {
            Value::Object(fields) => {
                for (key, field) in fields {
                    println!("{:<24} {}", format!("{}:", key), text_of(field));
                }
            }
            other => println!("{}", text_of(other)),
        },
    }
    Ok(())
}

/// Output rows as a fixed-width table of the given columns
pub fn output_table(output_format: OutputFormat, rows: &[Value], columns: &[&str]) -> anyhow::Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.get(*c).map(text_of).unwrap_or_default()).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| cells.iter().map(|r| r[i].len()).chain([c.len()]).max().unwrap_or(0))
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.to_uppercase(), w = *w))
        .collect();
    println!("{}", header.join("  "));
    for row in cells {
        let line: Vec<String> = row.iter().zip(&widths).map(|(v, w)| format!("{:<w$}", v, w = *w)).collect();
        println!("{}", line.join("  ").trim_end());
    }
    Ok(())
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pull `data` out of an API success envelope, or turn an error envelope into an error.
pub fn unwrap_envelope(status: reqwest::StatusCode, body: Value) -> anyhow::Result<Value> {
    if status.is_success() {
        return Ok(body.get("data").cloned().unwrap_or(body));
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();
    let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
    Err(anyhow::anyhow!("{} ({}, HTTP {})", message, code, status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_data_is_unwrapped() {
        let data = unwrap_envelope(reqwest::StatusCode::OK, json!({"success": true, "data": [1, 2]})).unwrap();
        assert_eq!(data, json!([1, 2]));
    }

    #[test]
    fn error_envelope_keeps_message_and_code() {
        let err = unwrap_envelope(
            reqwest::StatusCode::FORBIDDEN,
            json!({"error": true, "message": "Account is deactivated", "code": "FORBIDDEN"}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Account is deactivated (FORBIDDEN, HTTP 403)");
    }
}
