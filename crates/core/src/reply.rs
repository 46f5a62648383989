//! Decoding of completion replies into JSON.
//!
//! Models are asked for bare JSON but regularly wrap it in Markdown fences,
//! surround it with prose, or emit raw line breaks inside string literals
//! (typically multi-line XML). Decoding handles those cases without touching
//! content that is already correctly escaped: control characters are escaped
//! only where they appear inside a string literal, and existing escape
//! sequences are copied through unchanged.

use serde_json::Value;

use crate::error::CoreError;

/// Parse a completion reply as JSON.
///
/// Tries, in order: the reply as-is (fences stripped), the reply with raw
/// control characters inside strings escaped, and the outermost JSON
/// object/array span of the repaired text. Fails with
/// [`CoreError::MalformedResponse`] carrying the first parse error.
pub fn parse_json_reply(reply: &str) -> Result<Value, CoreError> {
    let candidate = strip_code_fences(reply);
    if candidate.is_empty() {
        return Err(CoreError::MalformedResponse(
            "completion reply is empty".to_string(),
        ));
    }

    let first_err = match serde_json::from_str(candidate) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let repaired = escape_control_chars_in_strings(candidate);
    if let Ok(value) = serde_json::from_str(&repaired) {
        return Ok(value);
    }

    for span in outer_json_spans(&repaired) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }

    Err(CoreError::MalformedResponse(first_err.to_string()))
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `xml`, ...) on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Escape raw control characters that appear inside JSON string literals.
///
/// Characters outside strings are left alone (whitespace there is legal),
/// and backslash escapes inside strings are copied verbatim so already
/// escaped content is never escaped twice.
pub fn escape_control_chars_in_strings(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() && (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }

    out
}

/// Candidate object and array spans, earliest opener first.
///
/// Each span runs from the first `{` (or `[`) to the last `}` (or `]`). Both
/// are tried because prose may contain a stray bracket before the payload.
fn outer_json_spans(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, &str)> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| {
            let start = text.find(open)?;
            let end = text.rfind(close)?;
            (end > start).then(|| (start, &text[start..=end]))
        })
        .collect();
    spans.sort_by_key(|(start, _)| *start);
    spans.into_iter().map(|(_, span)| span).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
