use serde_json::Value;

use super::cell_text;

/// Headline value of each command's result, in priority order.
const PRIORITY_POINTERS: [&str; 4] = [
    "/aggregates/kpis/total_profit/display",
    "/monthly_path",
    "/monthly",
    "/0",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for pointer in PRIORITY_POINTERS {
        if let Some(found) = result.pointer(pointer) {
            if !found.is_null() {
                println!("{}", summarize(found));
                return;
            }
        }
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, summarize(val));
            return;
        }
    }
    println!("{}", summarize(result));
}

/// Arrays collapse to their length; objects print their first two fields.
fn summarize(value: &Value) -> String {
    match value {
        Value::Array(arr) => format!("{} rows", arr.len()),
        Value::Object(map) => map
            .iter()
            .take(2)
            .map(|(k, v)| format!("{k}={}", cell_text(v)))
            .collect::<Vec<_>>()
            .join(" "),
        _ => cell_text(value),
    }
}
