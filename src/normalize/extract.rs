//! Locating the JSON document inside raw model output.
//!
//! Models are told to answer with JSON only, but sometimes wrap it in a
//! Markdown fence or a sentence of prose. These helpers find the document.

use serde_json::Value;

/// Strip a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
///
/// Returns the input unchanged when it is not fenced.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match body.find('\n') {
        Some(pos) => body[pos + 1..].trim(),
        None => body.trim(),
    }
}

/// Every balanced `{...}` span in `text`, in order of its opening brace.
///
/// One pass with a stack of open braces. String literals are tracked only
/// inside a brace, so quotes in the surrounding prose are ignored, and braces
/// inside a string never open or close a span.
pub fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    let mut spans = Vec::new();
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(offset),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, offset + 1));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans.into_iter().map(move |(start, end)| &text[start..end])
}

/// The first balanced span in `text` that parses as a JSON object
pub fn first_json_object(text: &str) -> Option<Value> {
    balanced_objects(text)
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .find(Value::is_object)
}
