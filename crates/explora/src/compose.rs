use serde_json::Value;

const PARAGRAPH_PREFIX: &str = "paragraph";
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Reduce a `content` field into a single text blob.
///
/// A map contributes its `paragraph*` entries in the order the provider wrote them (not
/// numeric order), skipping empty ones. Anything else is rendered as text.
pub fn compose(content: &Value) -> String {
    match content {
        Value::Object(map) => map
            .iter()
            .filter(|(key, value)| key.starts_with(PARAGRAPH_PREFIX) && is_truthy(value))
            .map(|(_, value)| value_to_text(value))
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR),
        other => value_to_text(other),
    }
}

/// Text form of a JSON value: strings unquoted, null empty, everything else as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compose_paragraphs_in_order() {
        let content = json!({
            "paragraph1": "Light is a wave.",
            "paragraph2": "It is also a particle.",
            "paragraph3": "Solar panels use this."
        });
        assert_eq!(
            compose(&content),
            "Light is a wave.\n\nIt is also a particle.\n\nSolar panels use this."
        );
    }

    #[test]
    fn test_compose_keeps_insertion_order_over_numeric_order() {
        let content: Value =
            serde_json::from_str(r#"{"paragraph2": "b", "paragraph1": "a", "x": "ignored"}"#)
                .unwrap();
        assert_eq!(compose(&content), "b\n\na");
    }

    #[test]
    fn test_compose_drops_empty_paragraphs_without_stray_separators() {
        let content = json!({
            "paragraph1": "a",
            "paragraph2": "",
            "paragraph3": null,
            "paragraph4": "d"
        });
        assert_eq!(compose(&content), "a\n\nd");

        let all_empty = json!({"paragraph1": "", "paragraph2": ""});
        assert_eq!(compose(&all_empty), "");
    }

    #[test]
    fn test_compose_ignores_non_paragraph_keys() {
        let content = json!({"intro": "skip", "paragraph1": "keep", "Paragraph2": "skip"});
        assert_eq!(compose(&content), "keep");
    }

    #[test]
    fn test_compose_non_string_paragraph_values() {
        let content = json!({"paragraph1": 42, "paragraph2": true, "paragraph3": 0});
        assert_eq!(compose(&content), "42\n\ntrue");
    }

    #[test]
    fn test_compose_scalar_content() {
        assert_eq!(compose(&json!("plain text")), "plain text");
        assert_eq!(compose(&json!(7)), "7");
        assert_eq!(compose(&json!(null)), "");
        assert_eq!(compose(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
