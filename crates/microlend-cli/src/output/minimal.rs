use serde_json::Value;

use super::format_value;

/// Keys that answer each command, most specific first.
const PRIORITY_KEYS: [&str; 6] = [
    "installment",
    "new_principal",
    "outstanding_balance",
    "amount_per_installment",
    "total_interest",
    "residual_balance",
];

/// Print just the key answer value from the output.
///
/// Looks through the result and one level of nested objects (the schedule
/// summary), then falls back to the first scalar field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        println!("{}", format_value(result));
        return;
    };

    let nested = map.values().filter_map(Value::as_object);
    let scopes: Vec<_> = std::iter::once(map).chain(nested).collect();

    for key in PRIORITY_KEYS {
        for scope in &scopes {
            if let Some(val) = scope.get(key) {
                // A null installment is the "not computable" answer
                println!("{}", if val.is_null() { "null".to_string() } else { format_value(val) });
                return;
            }
        }
    }

    if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_array() && !v.is_object()) {
        println!("{}: {}", key, format_value(val));
    }
}
