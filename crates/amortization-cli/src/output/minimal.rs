use serde_json::Value;

use super::{plain, solved_key};

/// Print just the answer: the solved quantity, the loan total, or one line per
/// validated field.
pub fn print_minimal(value: &Value) {
    if let Value::Array(outcomes) = value {
        for outcome in outcomes {
            let field = outcome.get("field").map(plain).unwrap_or_default();
            let accepted = outcome
                .get("accepted")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if accepted {
                println!("{}: ok", field);
            } else {
                let message = outcome.get("message").map(plain).unwrap_or_default();
                println!("{}: {}", field, message);
            }
        }
        return;
    }

    let result = value.get("result").unwrap_or(value);

    if let Some(map) = result.as_object() {
        let key = solved_key(map).or_else(|| map.contains_key("total_paid").then_some("total_paid"));
        if let Some(val) = key.and_then(|k| map.get(k)) {
            println!("{}", plain(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, plain(val));
            return;
        }
    }

    println!("{}", plain(result));
}
