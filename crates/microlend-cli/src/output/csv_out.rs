use serde_json::Value;
use std::io;

use super::{format_value, headers, row, split_sections};

/// Write output as CSV to stdout.
///
/// Results carrying installments or amortization periods are written one row
/// per item so they can be bulk-loaded; anything else is `field,value`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .and_then(Value::as_object);

    match result {
        Some(result) => {
            let sections = split_sections(result);
            if let Some((_, rows)) = sections.row_sets.first() {
                let headers = headers(rows);
                let _ = wtr.write_record(&headers);
                for item in rows.iter() {
                    let _ = wtr.write_record(row(item, &headers));
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in &sections.fields {
                    let _ = wtr.write_record([key, val]);
                }
            }
        }
        None => {
            let _ = wtr.write_record([format_value(value)]);
        }
    }

    let _ = wtr.flush();
}
