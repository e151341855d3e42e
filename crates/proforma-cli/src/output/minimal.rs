use serde_json::Value;

/// Print just the headline number from the output.
///
/// Heuristic: unwrap the result envelope, descend into the indicator
/// block when the result is a projection bundle, then try well-known
/// fields in priority order before falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // A projection bundle leads with its indicators
    let focus = result_obj
        .as_object()
        .and_then(|m| m.get("indicators"))
        .unwrap_or(result_obj);

    let priority_keys = [
        "npv",
        "irr",
        "units",
        "totalPrincipal",
        "totalInterest",
        "paybackYears",
    ];

    if let Value::Object(map) = focus {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(focus));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
