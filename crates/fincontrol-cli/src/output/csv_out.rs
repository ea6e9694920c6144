use serde_json::{Map, Value};
use std::io;

use super::{cell_text, is_record_array};

/// Tables preferred when a result carries several.
const PRIMARY_TABLES: [&str; 2] = ["filtered_monthly", "monthly"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => match primary_table(map) {
            Some(rows) => write_array_csv(&mut wtr, rows),
            None => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &cell_text(val)]);
                }
            }
        },
        _ => {
            let _ = wtr.write_record([&cell_text(result)]);
        }
    }

    let _ = wtr.flush();
}

fn primary_table(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    PRIMARY_TABLES
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|v| is_record_array(v))
        .and_then(Value::as_array)
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(cell_text).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&cell_text(item)]);
        }
    }
}
