use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_value, headers, row, split_sections};

/// Render the result envelope as tables: scalar fields first, then one table
/// per row set (installments, amortization periods).
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            let sections = split_sections(result);

            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in &sections.fields {
                let shown = if val.is_empty() { "—" } else { val.as_str() };
                builder.push_record([key.as_str(), shown]);
            }
            println!("{}", Table::from(builder));

            for (name, rows) in sections.row_sets {
                println!("\n{}:", name);
                print_rows(rows);
            }
        }
        _ => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in envelope {
                builder.push_record([key.clone(), format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_rows(rows: &[Value]) {
    let headers = headers(rows);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in rows {
        builder.push_record(row(item, &headers));
    }
    println!("{}", Table::from(builder));
}
