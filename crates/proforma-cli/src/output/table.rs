use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// The result envelope prints as scalar fields first, then one table per
/// year-keyed series (cash flows, statements, schedule rows), then any
/// warnings and the methodology line.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result, map);
            } else {
                print_object(value);
            }
        }
        Value::Array(arr) => print_array(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(map) => {
            // Scalars and small nested objects first
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            let mut has_scalars = false;
            for (key, val) in map {
                match val {
                    Value::Array(_) => continue,
                    Value::Object(nested) => {
                        for (nested_key, nested_val) in nested {
                            builder.push_record([
                                format!("{key}.{nested_key}").as_str(),
                                &format_value(nested_val),
                            ]);
                            has_scalars = true;
                        }
                    }
                    _ => {
                        builder.push_record([key.as_str(), &format_value(val)]);
                        has_scalars = true;
                    }
                }
            }
            if has_scalars {
                println!("{}", Table::from(builder));
            }

            // Then each series as its own table
            for (key, val) in map {
                if let Value::Array(arr) = val {
                    if !arr.is_empty() {
                        println!("\n{key}:");
                        print_array(arr);
                    }
                }
            }
        }
        _ => println!("{}", result),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn print_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array(arr: &[Value]) {
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
                    .map(|h| map.get(h).map(format_value).unwrap_or_default())
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
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}
