pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar fields and row tables pulled out of a result object.
pub(crate) struct SplitResult<'a> {
    /// Scalars, with nested objects flattened to dotted keys
    /// (`amortization.monthly_payment`).
    pub fields: Vec<(String, &'a Value)>,
    /// Arrays of objects such as the payment schedule, keyed the same way.
    pub tables: Vec<(String, &'a [Value])>,
}

/// The `result` inside a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

pub(crate) fn split_result(map: &Map<String, Value>) -> SplitResult<'_> {
    let mut split = SplitResult {
        fields: Vec::new(),
        tables: Vec::new(),
    };
    collect("", map, &mut split);
    split
}

fn collect<'a>(prefix: &str, map: &'a Map<String, Value>, split: &mut SplitResult<'a>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => collect(&name, inner, split),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                split.tables.push((name, items.as_slice()))
            }
            _ => split.fields.push((name, val)),
        }
    }
}

/// Render a JSON scalar for a cell.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
