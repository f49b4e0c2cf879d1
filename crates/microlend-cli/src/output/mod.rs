pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A computation result split into scalar fields and row collections.
///
/// Nested objects (e.g. `summary`) are flattened to dotted keys; arrays of
/// objects (`entries`, `periods`) are kept as row sets.
pub(crate) struct Sections<'a> {
    pub fields: Vec<(String, String)>,
    pub row_sets: Vec<(&'a str, &'a [Value])>,
}

pub(crate) fn split_sections(result: &Map<String, Value>) -> Sections<'_> {
    let mut sections = Sections {
        fields: Vec::new(),
        row_sets: Vec::new(),
    };
    for (key, val) in result {
        match val {
            Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
                sections.row_sets.push((key.as_str(), rows.as_slice()));
            }
            Value::Object(inner) => {
                for (k, v) in inner {
                    sections.fields.push((format!("{key}.{k}"), format_value(v)));
                }
            }
            _ => sections.fields.push((key.clone(), format_value(val))),
        }
    }
    sections
}

/// Column names of a row set, in first-row order.
pub(crate) fn headers(rows: &[Value]) -> Vec<String> {
    match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn row(item: &Value, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| item.get(h.as_str()).map(format_value).unwrap_or_default())
        .collect()
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
