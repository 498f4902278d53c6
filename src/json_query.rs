//! JSON path queries over a response body.
//!
//! Supports `$`, `$.field`, `$.field.nested`, `$.array[0]` and `$.array[*]`.

use serde_json::Value;

/// Evaluates `path` against `text` and pretty-prints the result.
/// A path that selects nothing yields `null`.
pub fn query_json_path(text: &str, path: &str) -> Result<String, String> {
    let json: Value = serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))?;
    let result = select(&json, path)?.unwrap_or(Value::Null);
    serde_json::to_string_pretty(&result).map_err(|e| e.to_string())
}

/// Walks the path. `Ok(None)` when a segment does not exist.
pub fn select(json: &Value, path: &str) -> Result<Option<Value>, String> {
    let path = path.trim();
    let Some(rest) = path.strip_prefix('$') else {
        return Err("JSON path must start with '$'".to_string());
    };
    let rest = rest.strip_prefix('.').unwrap_or(rest);

    walk(json, &split_path_segments(rest))
}

/// Applies `segments` to `current`. A `[*]` segment projects the remaining
/// path over every element and collects the hits into an array.
fn walk(current: &Value, segments: &[String]) -> Result<Option<Value>, String> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(Some(current.clone()));
    };

    let (name, index) = match parse_array_access(segment) {
        Some((name, index)) => (name, Some(index)),
        None => (segment.clone(), None),
    };
    let current = if name.is_empty() {
        current
    } else {
        match current.get(&name) {
            Some(v) => v,
            None => return Ok(None),
        }
    };

    match index.as_deref() {
        None => walk(current, rest),
        Some("*") => {
            let Some(items) = current.as_array() else {
                return Ok(None);
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if let Some(v) = walk(item, rest)? {
                    out.push(v);
                }
            }
            Ok(Some(Value::Array(out)))
        }
        Some(index) => {
            let idx: usize = index
                .parse()
                .map_err(|_| format!("Invalid array index: {}", index))?;
            match current.get(idx) {
                Some(v) => walk(v, rest),
                None => Ok(None),
            }
        }
    }
}

/// Splits on dots outside brackets.
fn split_path_segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for ch in path.chars() {
        match ch {
            '.' if !in_bracket => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                in_bracket = true;
                current.push(ch);
            }
            ']' => {
                in_bracket = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// "field[0]" → ("field", "0")
fn parse_array_access(segment: &str) -> Option<(String, String)> {
    let bracket_start = segment.find('[')?;
    if !segment.ends_with(']') {
        return None;
    }
    let name = segment[..bracket_start].to_string();
    let index = segment[bracket_start + 1..segment.len() - 1].to_string();
    Some((name, index))
}
