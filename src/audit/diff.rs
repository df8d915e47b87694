//! Field-level diff summaries for audit entries

use serde_json::Value;

/// Fields that change on every write and would only add noise
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_CHARS: usize = 40;

/// Summarize the top-level field changes between two JSON values
///
/// Returns None when nothing but ignored fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after)
            .then(|| format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();
    for (key, old) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, format_value(old), format_value(new)))
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(old))),
        }
    }
    for (key, new) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, format_value(new)));
        }
    }

    (!changes.is_empty()).then(|| changes.join(", "))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let truncated: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", truncated)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
