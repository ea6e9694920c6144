use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell_text, is_record_array};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => {
                print_section(None, result);
                print_envelope(map);
            }
            None => print_section(None, value),
        },
        _ => print_section(None, value),
    }
}

/// Scalars go into one Field/Value table; record arrays and nested
/// objects each get their own titled table.
fn print_section(title: Option<&str>, value: &Value) {
    match value {
        Value::Object(map) => {
            let (scalars, nested): (Vec<_>, Vec<_>) = map
                .iter()
                .partition(|(_, v)| !is_record_array(v) && !v.is_object());

            if !scalars.is_empty() {
                print_title(title);
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key.as_str(), &format_value(val)]);
                }
                println!("{}", Table::from(builder));
            }
            for (key, val) in nested {
                let sub = match title {
                    Some(t) => format!("{t}.{key}"),
                    None => key.clone(),
                };
                print_section(Some(sub.as_str()), val);
            }
        }
        Value::Array(arr) => {
            print_title(title);
            print_array_table(arr);
        }
        _ => {
            print_title(title);
            println!("{}", format_value(value));
        }
    }
}

fn print_title(title: Option<&str>) {
    if let Some(t) = title {
        println!("\n{t}");
    }
}

fn print_envelope(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {s}");
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        _ => cell_text(value),
    }
}
