use serde_json::Value;
use std::io;

use super::plain;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(envelope) => {
            let rows = match envelope.get("result") {
                Some(Value::Object(result)) => result,
                _ => envelope,
            };
            let _ = wtr.write_record(["quantity", "value"]);
            for (key, val) in rows {
                let _ = wtr.write_record([key.as_str(), &plain(val)]);
            }
        }
        Value::Array(items) => write_array(&mut wtr, items),
        _ => {
            let _ = wtr.write_record([&plain(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Header is the union of keys over all rows; accepted outcomes omit `reason`.
fn write_array(wtr: &mut csv::Writer<io::StdoutLock<'_>>, items: &[Value]) {
    let mut headers: Vec<&str> = Vec::new();
    for item in items.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key.as_str());
            }
        }
    }
    if headers.is_empty() {
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in items {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(plain).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}
