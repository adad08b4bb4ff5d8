use chrono::{DateTime, Utc};

use crate::model::Conversation;

const NO_TURNS_PLACEHOLDER: &str = "_(No message turns were detected in the shared conversation.)_";

pub fn render_markdown(conversation: &Conversation) -> String {
    let mut lines: Vec<String> = vec![
        format!("# {}", conversation.title),
        String::new(),
        format!("- Source: {}", conversation.source_url),
    ];

    if let Some(updated) = format_timestamp(conversation.updated_at) {
        lines.push(format!("- Updated: {updated}"));
    }

    if let Some(slug) = conversation
        .model_slug
        .as_deref()
        .filter(|slug| !slug.trim().is_empty())
    {
        lines.push(format!("- Model: {slug}"));
    }

    lines.push(String::new());

    for turn in &conversation.turns {
        lines.push(format!("## {}", turn.role));
        lines.push(String::new());

        let content = turn.content.trim();
        lines.push(if content.is_empty() {
            "_(empty)_".to_string()
        } else {
            content.to_string()
        });
        lines.push(String::new());
    }

    if conversation.turns.is_empty() {
        lines.push(NO_TURNS_PLACEHOLDER.to_string());
        lines.push(String::new());
    }

    let mut output = lines.join("\n").trim_end().to_string();
    output.push('\n');
    output
}

// Epoch seconds rendered as `YYYY-MM-DD HH:MM:SS UTC`, rounded to the
// nearest millisecond away from zero. Overflowing or non-finite values
// format as no timestamp at all.
pub fn format_timestamp(epoch_seconds: Option<f64>) -> Option<String> {
    let seconds = epoch_seconds?;
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }

    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(millis as i64)?;
    Some(utc.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}
