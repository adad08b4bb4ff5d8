use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::model::ExportOptions;

static PRIVATE_USE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{E000}-\u{F8FF}]").expect("valid regex"));
static CITATION_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*(?:citeturn|navlist|turn\d+\w*)[^,\s]*,?").expect("valid regex"));

// Assistant code blocks whose JSON body uses only these keys are tool
// invocations, not user-facing code.
const INTERNAL_ACTION_KEYS: &[&str] = &[
    "search_query",
    "open",
    "find",
    "click",
    "response_length",
    "navigate",
    "read",
    "image_query",
];

// Renders one message's content object into a cleaned text fragment. An
// empty result means the turn is dropped.
pub fn render_content(content: &Map<String, Value>, options: &ExportOptions) -> String {
    let content_type = content
        .get("content_type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match content_type {
        "text" => render_text_parts(content.get("parts")),
        "multimodal_text" => render_multimodal_parts(content.get("parts")),
        "code" => render_code(content, options),
        "tool_response" => render_tool_response(content),
        "thoughts" => render_thoughts(content, options),
        "reasoning_recap" => render_reasoning_recap(content, options),
        "model_editable_context" => clean_text(
            content
                .get("model_set_context")
                .and_then(Value::as_str)
                .unwrap_or_default(),
        ),
        _ => {
            let parts = render_text_parts(content.get("parts"));
            if !parts.trim().is_empty() {
                return parts;
            }

            match content.get("output").and_then(Value::as_str) {
                Some(output) => clean_text(output),
                None => String::new(),
            }
        }
    }
}

fn render_text_parts(parts: Option<&Value>) -> String {
    let Some(parts) = parts.and_then(Value::as_array) else {
        return String::new();
    };

    let mut rendered = Vec::new();
    for part in parts {
        let Some(text) = part.as_str() else {
            continue;
        };

        let mut candidate = clean_text(text);
        if candidate.is_empty() {
            continue;
        }

        // Some text parts arrive as JSON-wrapped strings; unwrap the inner
        // field when the part is such an envelope, otherwise keep the raw
        // text.
        if candidate.starts_with('{')
            && candidate.ends_with('}')
            && let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(&candidate)
        {
            let inner = envelope
                .get("response")
                .and_then(Value::as_str)
                .or_else(|| envelope.get("content").and_then(Value::as_str));
            if let Some(inner) = inner {
                candidate = clean_text(inner);
            }
        }

        if !candidate.is_empty() {
            rendered.push(candidate);
        }
    }

    rendered.join("\n\n")
}

fn render_multimodal_parts(parts: Option<&Value>) -> String {
    let Some(parts) = parts.and_then(Value::as_array) else {
        return String::new();
    };

    let mut segments = Vec::new();
    for part in parts {
        if let Some(text) = part.as_str() {
            push_cleaned(&mut segments, text);
            continue;
        }

        let Some(item) = part.as_object() else {
            continue;
        };

        let part_type = item
            .get("content_type")
            .and_then(Value::as_str)
            .or_else(|| item.get("type").and_then(Value::as_str));

        match part_type {
            Some("text") => match item.get("text") {
                Some(Value::String(text)) => push_cleaned(&mut segments, text),
                Some(Value::Array(items)) => {
                    for text in items {
                        if let Some(text) = text.as_str() {
                            push_cleaned(&mut segments, text);
                        }
                    }
                }
                _ => {}
            },
            Some("image_asset_pointer" | "file") => {
                if let Some(pointer) = item.get("asset_pointer").and_then(Value::as_str)
                    && !pointer.trim().is_empty()
                {
                    segments.push(format!("[Asset: {pointer}]"));
                }
            }
            _ => {}
        }
    }

    segments.join("\n\n")
}

fn push_cleaned(segments: &mut Vec<String>, text: &str) {
    let cleaned = clean_text(text);
    if !cleaned.is_empty() {
        segments.push(cleaned);
    }
}

fn render_code(content: &Map<String, Value>, options: &ExportOptions) -> String {
    let mut language = content
        .get("language")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if language == "unknown" {
        language = "";
    }

    let code = content
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim_end_matches(['\n', '\r']);
    if code.trim().is_empty() {
        return String::new();
    }

    if !options.include_internal_actions && looks_like_internal_action_payload(code) {
        return String::new();
    }

    format!("```{language}\n{code}\n```")
}

fn render_tool_response(content: &Map<String, Value>) -> String {
    match content.get("output") {
        Some(Value::String(output)) => clean_text(output),
        Some(Value::Object(output)) => {
            let pretty = serde_json::to_string_pretty(output).unwrap_or_default();
            format!("```json\n{pretty}\n```")
        }
        _ => String::new(),
    }
}

fn render_thoughts(content: &Map<String, Value>, options: &ExportOptions) -> String {
    if !options.include_reasoning {
        return String::new();
    }

    let mut lines = Vec::new();
    for thought in content
        .get("thoughts")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let Some(thought) = thought.as_object() else {
            continue;
        };

        let summary = thought
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let detail = thought
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let combined = [summary, detail]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(": ");

        let cleaned = clean_text(&combined);
        if !cleaned.is_empty() {
            lines.push(cleaned);
        }
    }

    lines.join("\n\n")
}

fn render_reasoning_recap(content: &Map<String, Value>, options: &ExportOptions) -> String {
    if !options.include_reasoning {
        return String::new();
    }

    let recap = clean_text(
        content
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default(),
    );
    if recap.is_empty() {
        String::new()
    } else {
        format!("_{recap}_")
    }
}

fn looks_like_internal_action_payload(code: &str) -> bool {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(code) else {
        return false;
    };

    !object.is_empty()
        && object
            .keys()
            .all(|key| INTERNAL_ACTION_KEYS.contains(&key.as_str()))
}

// Normalizes line endings, strips private-use-area code points, removes
// citation-token artifacts per line, and trims. Idempotent.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = PRIVATE_USE_RE.replace_all(&normalized, "");

    let lines: Vec<String> = stripped
        .split('\n')
        .map(|line| CITATION_TOKEN_RE.replace_all(line, "").trim_end().to_string())
        .collect();

    lines.join("\n").trim().to_string()
}
