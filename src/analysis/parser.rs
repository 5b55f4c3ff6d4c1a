//! Response parser: pulls one JSON object out of free-form provider text.

use serde_json::{Map, Value};

/// Extract the first balanced `{ ... }` span from `text` and parse it.
///
/// Brace depth is tracked outside string literals only, so braces inside
/// quoted values do not end the span early. Returns `None` when there is no
/// opening brace, the span never closes, or the span is not valid JSON.
/// Never panics.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = balanced_end(&text[start..])? + start;

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Byte offset of the brace closing the one at offset 0.
fn balanced_end(span: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in span.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
