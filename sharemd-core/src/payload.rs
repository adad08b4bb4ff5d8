use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("valid selector"));

const STREAM_MARKER: &str = "streamController.enqueue";
const STREAM_MARKER_CALL: &str = "streamController.enqueue(";
const LEGACY_SCRIPT_ID: &str = "__NEXT_DATA__";

// Each streaming-enqueue call carries one JSON string literal; the first
// literal that decodes to a JSON array is the loader payload. Any failure
// (unterminated literal, bad escape, non-array chunk) advances the scan
// instead of aborting.
pub fn extract_loader_payload(html: &str) -> Option<Vec<Value>> {
    let document = Html::parse_document(html);

    for script in document.select(&SCRIPT_SELECTOR) {
        let body: String = script.text().collect();
        if !body.contains(STREAM_MARKER) {
            continue;
        }

        let mut start = 0;
        while let Some(found) = body[start..].find(STREAM_MARKER_CALL) {
            let anchor = start + found + STREAM_MARKER_CALL.len();

            let Some((literal, next_index)) = read_json_string_literal(&body, anchor) else {
                start = next_char_boundary(&body, anchor);
                continue;
            };

            let Ok(chunk) = serde_json::from_str::<String>(literal) else {
                start = next_index;
                continue;
            };

            let chunk = chunk.trim();
            if chunk.starts_with('[')
                && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(chunk)
            {
                return Some(items);
            }

            start = next_index;
        }
    }

    None
}

// The parsed __NEXT_DATA__ root counts only when it is a JSON object; a
// missing script or malformed body is None.
pub fn extract_legacy_payload(html: &str) -> Option<Value> {
    let document = Html::parse_document(html);

    for script in document.select(&SCRIPT_SELECTOR) {
        if script.value().attr("id") != Some(LEGACY_SCRIPT_ID) {
            continue;
        }

        let body: String = script.text().collect();
        return serde_json::from_str::<Value>(&body)
            .ok()
            .filter(Value::is_object);
    }

    None
}

// Walks a JSON string literal starting at `start` (after optional
// whitespace), honoring backslash escapes to find the closing quote; the
// literal sits inside a larger non-JSON script body, so a JSON parser
// cannot be pointed at it directly. Returns the literal including its
// quotes and the byte index just past it.
fn read_json_string_literal(text: &str, start: usize) -> Option<(&str, usize)> {
    let mut chars = text[start..]
        .char_indices()
        .map(|(offset, ch)| (start + offset, ch));

    let mut open = None;
    for (position, ch) in chars.by_ref() {
        if ch.is_whitespace() {
            continue;
        }
        if ch == '"' {
            open = Some(position);
        }
        break;
    }
    let open = open?;

    let mut escaped = false;
    for (position, ch) in chars {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            return Some((&text[open..=position], position + 1));
        }
    }

    None
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    let advance = text[index..].chars().next().map_or(1, char::len_utf8);
    (index + advance).min(text.len())
}
