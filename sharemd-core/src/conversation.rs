use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::content::render_content;
use crate::model::{Conversation, ExportOptions, Turn, TurnRole};
use crate::share_url::ShareUrl;

const DEFAULT_TITLE: &str = "ChatGPT conversation";

// Depth-first search for the first object carrying all three conversation
// marker keys; the decoded modern payload nests the record at an
// unpredictable depth.
pub fn find_conversation_data(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object) => {
            if object.contains_key("title")
                && object.contains_key("mapping")
                && object.contains_key("linear_conversation")
            {
                return Some(object);
            }
            object.values().find_map(find_conversation_data)
        }
        Value::Array(items) => items.iter().find_map(find_conversation_data),
        _ => None,
    }
}

pub fn build_conversation(
    data: &Map<String, Value>,
    share_url: &ShareUrl,
    options: &ExportOptions,
) -> Conversation {
    let model = data.get("model").and_then(Value::as_object);

    Conversation {
        share_id: share_url.share_id().to_string(),
        source_url: share_url.as_str().to_string(),
        title: data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        updated_at: data.get("update_time").and_then(Value::as_f64),
        model_slug: model
            .and_then(|model| model.get("slug"))
            .and_then(Value::as_str)
            .map(ToString::to_string),
        turns: parse_turns(data, options),
    }
}

fn parse_turns(data: &Map<String, Value>, options: &ExportOptions) -> Vec<Turn> {
    let empty_mapping = Map::new();
    let mapping = data
        .get("mapping")
        .and_then(Value::as_object)
        .unwrap_or(&empty_mapping);
    let linear = data
        .get("linear_conversation")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen_message_ids: HashSet<String> = HashSet::new();
    let mut turns = Vec::new();

    for entry in linear {
        let Some(entry) = entry.as_object() else {
            continue;
        };

        if let Some(inline) = entry.get("message").and_then(Value::as_object) {
            maybe_add_turn(&mut turns, &mut seen_message_ids, inline, options);
            continue;
        }

        let Some(node_id) = entry
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
        else {
            continue;
        };

        if let Some(message) = mapping
            .get(node_id)
            .and_then(Value::as_object)
            .and_then(|node| node.get("message"))
            .and_then(Value::as_object)
        {
            maybe_add_turn(&mut turns, &mut seen_message_ids, message, options);
        }
    }

    if !turns.is_empty() {
        return turns;
    }

    // No usable linear order; reconstruct from the node graph. Mapping
    // iteration order must not leak into the output, so the result is
    // stable-sorted by create_time.
    let mut fallback = Vec::new();
    for node in mapping.values() {
        let Some(message) = node
            .as_object()
            .and_then(|node| node.get("message"))
            .and_then(Value::as_object)
        else {
            continue;
        };

        maybe_add_turn(&mut fallback, &mut seen_message_ids, message, options);
    }

    fallback.sort_by(|a, b| compare_create_time(a.create_time, b.create_time));
    fallback
}

fn maybe_add_turn(
    turns: &mut Vec<Turn>,
    seen_message_ids: &mut HashSet<String>,
    message: &Map<String, Value>,
    options: &ExportOptions,
) {
    let Some(turn) = parse_message(message, options) else {
        return;
    };

    if let Some(message_id) = turn.message_id.as_deref().filter(|id| !id.trim().is_empty())
        && !seen_message_ids.insert(message_id.to_string())
    {
        return;
    }

    turns.push(turn);
}

fn parse_message(message: &Map<String, Value>, options: &ExportOptions) -> Option<Turn> {
    let role = message
        .get("author")
        .and_then(Value::as_object)
        .and_then(|author| author.get("role"))
        .and_then(Value::as_str);

    if role == Some("system") {
        return None;
    }

    if role == Some("tool") && !options.include_tool_turns {
        return None;
    }

    let content = message
        .get("content")
        .and_then(Value::as_object)
        .map(|content| render_content(content, options))
        .unwrap_or_default();
    if content.trim().is_empty() {
        return None;
    }

    Some(Turn {
        role: TurnRole::from_raw(role),
        content,
        create_time: message.get("create_time").and_then(Value::as_f64),
        message_id: message
            .get("id")
            .and_then(Value::as_str)
            .map(ToString::to_string),
    })
}

// Missing timestamps sort before all timestamped turns; the sort itself is
// stable, so equal keys keep their input order.
fn compare_create_time(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}
