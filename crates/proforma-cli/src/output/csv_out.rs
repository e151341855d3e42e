use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A result carrying year-keyed series emits the first series found;
/// scalar results emit field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            match result {
                Value::Object(result_map) => {
                    if let Some(Value::Array(series)) = first_series(result_map) {
                        write_array(&mut wtr, series);
                    } else {
                        let _ = wtr.write_record(["field", "value"]);
                        for (key, val) in result_map {
                            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                        }
                    }
                }
                Value::Array(arr) => write_array(&mut wtr, arr),
                other => {
                    let _ = wtr.write_record([&format_csv_value(other)]);
                }
            }
        }
        Value::Array(arr) => write_array(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn first_series(map: &serde_json::Map<String, Value>) -> Option<&Value> {
    // Preferred order for projection bundles
    for key in ["cashFlows", "results", "rows"] {
        if let Some(series @ Value::Array(_)) = map.get(key) {
            return Some(series);
        }
    }
    map.values().find(|v| matches!(v, Value::Array(arr) if !arr.is_empty()))
}

fn write_array(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
