use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{plain, solved_key};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(envelope) => match envelope.get("result") {
            Some(Value::Object(result)) => {
                print_result(result);
                print_notes(envelope);
            }
            _ => print_rows(envelope),
        },
        Value::Array(outcomes) => print_outcomes(outcomes),
        other => println!("{}", plain(other)),
    }
}

fn print_result(result: &Map<String, Value>) {
    let solved = solved_key(result);

    let mut builder = Builder::default();
    builder.push_record(["Quantity", "Value"]);
    for (key, val) in result {
        if key == "solved_for" || key == "solved_value" {
            continue;
        }
        let label = if Some(key.as_str()) == solved {
            format!("{key} (solved)")
        } else {
            key.clone()
        };
        builder.push_record([label, plain(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), plain(val)]);
    }
    println!("{}", Table::from(builder));
}

/// One row per validated field.
fn print_outcomes(outcomes: &[Value]) {
    if outcomes.is_empty() {
        println!("(no fields supplied)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Accepted", "Message"]);
    for outcome in outcomes {
        let cell = |key: &str| outcome.get(key).map(plain).unwrap_or_default();
        builder.push_record([cell("field"), cell("accepted"), cell("message")]);
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
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
