use serde_json::{Map, Value};

use crate::models::posts::{ChannelDraft, Drafts, MessageDraft};

/// Never fails: missing channels and mistyped fields collapse to empty defaults.
pub fn normalize_drafts(raw: &Value) -> Drafts {
    Drafts {
        blog: channel_draft(raw.get("blog")),
        linkedin: channel_draft(raw.get("linkedin")),
        whatsapp: MessageDraft {
            message: raw
                .get("whatsapp")
                .and_then(Value::as_object)
                .map(|obj| text(obj.get("message")))
                .unwrap_or_default(),
        },
    }
}

fn channel_draft(value: Option<&Value>) -> ChannelDraft {
    let Some(obj) = value.and_then(Value::as_object) else {
        return ChannelDraft::default();
    };

    ChannelDraft {
        title: text(obj.get("title")),
        content: text(content_field(obj)),
        tags: tags(obj.get("tags")),
    }
}

/// Models sometimes answer with `description` instead of `content`.
fn content_field(obj: &Map<String, Value>) -> Option<&Value> {
    obj.get("content").or_else(|| obj.get("description"))
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_tags(s),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| text(Some(item)).trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("blog".to_string()),
            Just("linkedin".to_string()),
            Just("whatsapp".to_string()),
            Just("title".to_string()),
            Just("content".to_string()),
            Just("description".to_string()),
            Just("tags".to_string()),
            Just("message".to_string()),
            "[a-z]{1,8}",
        ]
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            any::<f64>().prop_map(Value::from),
            "[ a-z0-9,\\t]{0,24}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(arb_key(), inner, 0..6)
                    .prop_map(|fields| Value::Object(fields.into_iter().collect())),
            ]
        })
    }

    fn assert_clean_tags(tags: &[String]) -> std::result::Result<(), TestCaseError> {
        for tag in tags {
            prop_assert!(!tag.is_empty());
            prop_assert_eq!(tag.as_str(), tag.trim());
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_any_model_output_normalizes(raw in arb_json()) {
            let drafts = normalize_drafts(&raw);

            assert_clean_tags(&drafts.blog.tags)?;
            assert_clean_tags(&drafts.linkedin.tags)?;
            if !raw.is_object() {
                prop_assert_eq!(drafts, Drafts::default());
            }
        }

        #[test]
        fn prop_normalized_drafts_are_stable(raw in arb_json()) {
            let drafts = normalize_drafts(&raw);
            let again = normalize_drafts(&serde_json::to_value(&drafts).unwrap());
            prop_assert_eq!(again, drafts);
        }

        #[test]
        fn prop_split_tags_yields_trimmed_tags(raw in "[ a-z,\\t\\n]{0,40}") {
            let tags = split_tags(&raw);

            assert_clean_tags(&tags)?;
            prop_assert!(tags.iter().all(|tag| !tag.contains(',')));
            prop_assert_eq!(tags.len(), raw.split(',').filter(|t| !t.trim().is_empty()).count());
        }
    }

    #[test]
    fn complete_output_passes_through() {
        let raw = json!({
            "blog": { "title": "AI Trends", "content": "Body", "tags": ["ai", "ml"] },
            "linkedin": { "title": "Post", "content": "Pro", "tags": ["career"] },
            "whatsapp": { "message": "Hey!" }
        });

        let drafts = normalize_drafts(&raw);
        assert_eq!(drafts.blog.title, "AI Trends");
        assert_eq!(drafts.blog.tags, vec!["ai", "ml"]);
        assert_eq!(drafts.linkedin.content, "Pro");
        assert_eq!(drafts.whatsapp.message, "Hey!");
    }

    #[test]
    fn missing_everything_yields_defaults() {
        for raw in [json!({}), json!(null), json!("text"), json!([1, 2])] {
            assert_eq!(normalize_drafts(&raw), Drafts::default());
        }
    }

    #[test]
    fn non_object_channels_yield_defaults() {
        let raw = json!({ "blog": "just text", "linkedin": 42, "whatsapp": ["hi"] });
        assert_eq!(normalize_drafts(&raw), Drafts::default());
    }

    #[test]
    fn description_becomes_content() {
        let raw = json!({ "blog": { "title": "T", "description": "from description" } });
        let drafts = normalize_drafts(&raw);
        assert_eq!(drafts.blog.content, "from description");
        assert!(drafts.blog.tags.is_empty());
    }

    #[test]
    fn content_wins_over_description() {
        let raw = json!({ "linkedin": { "content": "real", "description": "ignored" } });
        assert_eq!(normalize_drafts(&raw).linkedin.content, "real");
    }

    #[test]
    fn comma_separated_tags_are_split_and_trimmed() {
        let raw = json!({ "blog": { "tags": " ai, ,ml ,  , data science," } });
        assert_eq!(normalize_drafts(&raw).blog.tags, vec!["ai", "ml", "data science"]);
    }

    #[test]
    fn tag_arrays_drop_blanks_and_render_scalars() {
        let raw = json!({ "blog": { "tags": [" rust ", "", 2024, true, null, {"x": 1}] } });
        assert_eq!(normalize_drafts(&raw).blog.tags, vec!["rust", "2024", "true"]);
    }

    #[test]
    fn wrong_scalar_types_are_coerced() {
        let raw = json!({
            "blog": { "title": 7, "content": null, "tags": 3 },
            "whatsapp": { "message": false }
        });
        let drafts = normalize_drafts(&raw);
        assert_eq!(drafts.blog.title, "7");
        assert_eq!(drafts.blog.content, "");
        assert!(drafts.blog.tags.is_empty());
        assert_eq!(drafts.whatsapp.message, "false");
    }

    #[test]
    fn split_tags_handles_empty_input() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }
}
