// Step list extraction from model text.
//
// Models often ignore "JSON only": fences and prose around the array are
// tolerated, everything else is MalformedStepData.

use regex::Regex;
use screenpilot_types::ParsedStep;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::{AssistError, Result};

/// A fence line, language tag included
static FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t\r]*$").expect("static regex")
});

pub fn parse_steps(raw: &str) -> Result<Vec<ParsedStep>> {
    let unfenced = FENCE_LINE.replace_all(raw.trim(), "").replace("```", "");
    let text = slice_array(unfenced.trim());

    let value: Value = serde_json::from_str(text)
        .map_err(|e| AssistError::MalformedStepData(format!("invalid JSON: {}", e)))?;

    let items = value
        .as_array()
        .ok_or_else(|| AssistError::MalformedStepData("expected a JSON array".to_string()))?;

    if items.is_empty() {
        return Err(AssistError::MalformedStepData("step list is empty".to_string()));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_step(index, item))
        .collect()
}

/// Span from the first `[` to the last `]`, or the whole text if there is none
fn slice_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn parse_step(index: usize, item: &Value) -> Result<ParsedStep> {
    let object = item.as_object().ok_or_else(|| {
        AssistError::MalformedStepData(format!("step {} is not an object", index))
    })?;

    let field = |name: &str| -> Result<String> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                AssistError::MalformedStepData(format!(
                    "step {} is missing string field `{}`",
                    index, name
                ))
            })
    };

    let title = field("title")?;
    if title.is_empty() {
        return Err(AssistError::MalformedStepData(format!(
            "step {} has an empty title",
            index
        )));
    }

    Ok(ParsedStep {
        title,
        description: field("description")?,
    })
}

/// Canned list returned when step generation fails
pub fn fallback_steps() -> Vec<ParsedStep> {
    vec![
        ParsedStep::new("目標の詳細を確認", "何が必要かを調べる"),
        ParsedStep::new("準備を始める", "必要なものを揃える"),
        ParsedStep::new("実行する", "実際に作業を進める"),
        ParsedStep::new("完了を確認", "目標が達成できたか確認"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Vec<ParsedStep> {
        vec![ParsedStep::new("A", "B")]
    }

    #[test]
    fn test_fenced_json() {
        let raw = "```json\n[{\"title\":\"A\",\"description\":\"B\"}]\n```";
        assert_eq!(parse_steps(raw).unwrap(), single());
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n[{\"title\":\"A\",\"description\":\"B\"}]\n```";
        assert_eq!(parse_steps(raw).unwrap(), single());
    }

    #[test]
    fn test_surrounding_prose() {
        let raw = "Sure! [{\"title\":\"A\",\"description\":\"B\"}] Hope this helps.";
        assert_eq!(parse_steps(raw).unwrap(), single());
    }

    #[test]
    fn test_prose_around_fenced_block() {
        let raw = "Here are your steps:\n```json\n[{\"title\":\"A\",\"description\":\"B\"}]\n```\nGood luck!";
        assert_eq!(parse_steps(raw).unwrap(), single());
    }

    #[test]
    fn test_inline_backticks_keep_following_words() {
        let raw = concat!(
            "```json\n",
            r#"[{"title":"Install","description":"Run ```pip install requests``` in a terminal"}]"#,
            "\n```"
        );
        let steps = parse_steps(raw).unwrap();
        assert_eq!(steps[0].description, "Run pip install requests in a terminal");
    }

    #[test]
    fn test_multiple_steps_keep_order() {
        let raw = r#"[
            {"title": "Install", "description": "Get Python"},
            {"title": "Run", "description": "python hello.py"}
        ]"#;
        let steps = parse_steps(raw).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].title, "Install");
        assert_eq!(steps[1].description, "python hello.py");
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            parse_steps("not json at all"),
            Err(AssistError::MalformedStepData(_))
        ));
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(matches!(parse_steps("[]"), Err(AssistError::MalformedStepData(_))));
    }

    #[test]
    fn test_object_rejected() {
        assert!(matches!(
            parse_steps(r#"{"title": "A", "description": "B"}"#),
            Err(AssistError::MalformedStepData(_))
        ));
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = parse_steps(r#"[{"title": "A"}]"#).unwrap_err();
        match err {
            AssistError::MalformedStepData(reason) => assert!(reason.contains("description")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_string_field_rejected() {
        assert!(parse_steps(r#"[{"title": 1, "description": "B"}]"#).is_err());
        assert!(parse_steps(r#"["just a string"]"#).is_err());
    }

    #[test]
    fn test_reversed_brackets() {
        assert!(parse_steps("] nothing [").is_err());
    }

    #[test]
    fn test_fallback_has_four_steps() {
        let steps = fallback_steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].title, "目標の詳細を確認");
    }
}
