use serde_json::Value;

use crate::conversation::{build_conversation, find_conversation_data};
use crate::error::{ExportError, Result};
use crate::fetch::fetch_share_html;
use crate::loader::decode_loader;
use crate::markdown::render_markdown;
use crate::model::{Conversation, ExportOptions};
use crate::payload::{extract_legacy_payload, extract_loader_payload};
use crate::share_url::ShareUrl;

pub fn export_conversation(share_url: &str, options: &ExportOptions) -> Result<String> {
    let share_url = ShareUrl::parse(share_url)?;
    let html = fetch_share_html(&share_url)?;
    let conversation = convert_html(&html, &share_url, options)?;
    Ok(render_markdown(&conversation))
}

// Modern loader format first, legacy __NEXT_DATA__ as the fallback; when
// both fail the surfaced error reports both causes.
pub fn convert_html(
    html: &str,
    share_url: &ShareUrl,
    options: &ExportOptions,
) -> Result<Conversation> {
    match parse_modern_share(html, share_url, options) {
        Ok(conversation) => Ok(conversation),
        Err(modern) => match parse_legacy_share(html, share_url, options) {
            Ok(conversation) => Ok(conversation),
            Err(legacy) => Err(ExportError::ParseFailed {
                modern: modern.to_string(),
                legacy: legacy.to_string(),
            }),
        },
    }
}

fn parse_modern_share(
    html: &str,
    share_url: &ShareUrl,
    options: &ExportOptions,
) -> Result<Conversation> {
    let loader =
        extract_loader_payload(html).ok_or(ExportError::PayloadNotFound("modern"))?;
    let decoded = Value::Object(decode_loader(&loader));
    let data = find_conversation_data(&decoded).ok_or(ExportError::PayloadShape("modern"))?;
    Ok(build_conversation(data, share_url, options))
}

fn parse_legacy_share(
    html: &str,
    share_url: &ShareUrl,
    options: &ExportOptions,
) -> Result<Conversation> {
    let payload = extract_legacy_payload(html).ok_or(ExportError::PayloadNotFound("legacy"))?;
    let data = payload
        .pointer("/props/pageProps/serverResponse/data")
        .and_then(Value::as_object)
        .ok_or(ExportError::PayloadShape("legacy"))?;
    Ok(build_conversation(data, share_url, options))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::convert_html;
    use crate::markdown::render_markdown;
    use crate::model::ExportOptions;
    use crate::share_url::ShareUrl;

    fn share_url() -> ShareUrl {
        ShareUrl::parse("https://chatgpt.com/share/abc-123").expect("share url")
    }

    fn legacy_script(data: serde_json::Value) -> String {
        let next_data = json!({
            "props": {"pageProps": {"serverResponse": {"data": data}}},
        });
        format!(r#"<script id="__NEXT_DATA__" type="application/json">{next_data}</script>"#)
    }

    fn legacy_html(data: serde_json::Value) -> String {
        format!(
            "<html><head>{}</head><body></body></html>",
            legacy_script(data)
        )
    }

    fn modern_script(loader: &serde_json::Value) -> String {
        let chunk = loader.to_string();
        let literal = serde_json::to_string(&chunk).expect("literal");
        format!(
            "<script>window.__stream = new ReadableStream({{start(streamController){{streamController.enqueue({literal});}}}});</script>"
        )
    }

    fn modern_html(loader: &serde_json::Value) -> String {
        format!("<html><body>{}</body></html>", modern_script(loader))
    }

    fn message(id: &str, role: &str, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "author": {"role": role},
            "create_time": null,
            "content": {"content_type": "text", "parts": [text]},
        })
    }

    #[test]
    fn legacy_round_trip_produces_expected_markdown() {
        let html = legacy_html(json!({
            "title": "T",
            "mapping": {},
            "linear_conversation": [
                {"message": message("m1", "user", "Hello")},
                {"message": message("m2", "assistant", "Hi there")},
            ],
        }));

        let conversation =
            convert_html(&html, &share_url(), &ExportOptions::default()).expect("convert");
        assert_eq!(
            render_markdown(&conversation),
            "# T\n\n- Source: https://chatgpt.com/share/abc-123\n\n## User\n\nHello\n\n## Assistant\n\nHi there\n"
        );
    }

    #[test]
    fn modern_loader_round_trip_resolves_references() {
        // The conversation record lives behind back-references: the value
        // at pair position is a reference to index 4, whose "title" field
        // is itself a reference to the string at index 5.
        let loader = json!([
            null,
            "conversation",
            4,
            "unused",
            {
                "title": 5,
                "mapping": {},
                "linear_conversation": [
                    {"message": message("m1", "user", "Hello")},
                    {"message": message("m2", "assistant", "Hi there")},
                ],
            },
            "Loader chat",
        ]);

        let conversation =
            convert_html(&modern_html(&loader), &share_url(), &ExportOptions::default())
                .expect("convert");

        assert_eq!(conversation.title, "Loader chat");
        assert_eq!(conversation.turns.len(), 2);
        assert_eq!(conversation.turns[0].content, "Hello");
        assert_eq!(conversation.turns[1].content, "Hi there");
    }

    #[test]
    fn modern_format_wins_over_legacy_when_both_present() {
        let loader = json!([
            null,
            "conversation",
            {
                "title": "Modern title",
                "mapping": {},
                "linear_conversation": [
                    {"message": message("m1", "user", "modern hello")},
                ],
            },
        ]);
        let html = format!(
            "<html><head>{}</head><body>{}</body></html>",
            legacy_script(json!({
                "title": "Legacy title",
                "mapping": {},
                "linear_conversation": [{"message": message("m1", "user", "legacy hello")}],
            })),
            modern_script(&loader)
        );

        let conversation =
            convert_html(&html, &share_url(), &ExportOptions::default()).expect("convert");
        assert_eq!(conversation.title, "Modern title");
    }

    #[test]
    fn falls_back_to_legacy_when_modern_is_missing() {
        let html = legacy_html(json!({
            "title": "Legacy only",
            "mapping": {},
            "linear_conversation": [{"message": message("m1", "user", "hi")}],
        }));

        let conversation =
            convert_html(&html, &share_url(), &ExportOptions::default()).expect("convert");
        assert_eq!(conversation.title, "Legacy only");
    }

    #[test]
    fn reports_both_failures_when_neither_format_parses() {
        let err = convert_html(
            "<html><body>no payload here</body></html>",
            &share_url(),
            &ExportOptions::default(),
        )
        .expect_err("must fail");

        let message = format!("{err}");
        assert!(message.contains("modern parse failed: modern share payload not found"));
        assert!(message.contains("legacy parse failed: legacy share payload not found"));
    }

    #[test]
    fn decoded_payload_without_conversation_shape_is_a_shape_error() {
        let loader = json!([null, "conversation", {"title": "T", "mapping": {}}]);
        let err = convert_html(&modern_html(&loader), &share_url(), &ExportOptions::default())
            .expect_err("must fail");

        assert!(format!("{err}").contains("conversation data not found in modern payload"));
    }

    #[test]
    fn legacy_payload_with_non_object_data_is_a_shape_error() {
        let html = legacy_html(json!("not an object"));
        let err = convert_html(&html, &share_url(), &ExportOptions::default())
            .expect_err("must fail");

        assert!(format!("{err}").contains("conversation data not found in legacy payload"));
    }

    #[test]
    fn zero_turn_conversation_renders_placeholder_document() {
        let html = legacy_html(json!({
            "title": "Empty",
            "mapping": {},
            "linear_conversation": [],
        }));

        let conversation =
            convert_html(&html, &share_url(), &ExportOptions::default()).expect("convert");
        let markdown = render_markdown(&conversation);

        assert!(markdown.contains(
            "_(No message turns were detected in the shared conversation.)_"
        ));
    }
}
