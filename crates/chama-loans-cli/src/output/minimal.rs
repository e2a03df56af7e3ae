use serde_json::Value;

use super::{format_value, result_of, split_result};

/// Headline figure of each command, in priority order.
const PRIORITY_KEYS: [&str; 3] = ["max_principal", "monthly_payment", "net_disbursement"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = result_of(value);

    if let Value::Object(map) = result_obj {
        let split = split_result(map);

        for key in PRIORITY_KEYS {
            let suffix = format!(".{}", key);
            let hit = split
                .fields
                .iter()
                .find(|(name, val)| (name == key || name.ends_with(&suffix)) && !val.is_null());
            if let Some((_, val)) = hit {
                println!("{}", format_value(val));
                return;
            }
        }

        if let Some((key, val)) = split.fields.first() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    if let Value::Array(items) = result_obj {
        println!("{}", items.len());
        return;
    }

    println!("{}", format_value(result_obj));
}
