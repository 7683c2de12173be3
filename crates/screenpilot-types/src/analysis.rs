use serde::{Deserialize, Serialize};

use crate::steps::ParsedStep;

/// User-supplied objective used to bias the generated advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalContext {
    pub objective: String,
    pub current_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl GoalContext {
    pub fn new(objective: impl Into<String>, current_status: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            current_status: current_status.into(),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }
}

/// One prior question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A single screenshot question, immutable for the lifetime of one invocation.
///
/// `history` is ordered oldest to newest. `None` and `Some(vec![])` are
/// different: a supplied history, even an empty one, selects the
/// goal-directed prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "image", default)]
    pub image_data_uri: String,
    #[serde(default)]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl AnalysisRequest {
    pub fn new(image_data_uri: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            image_data_uri: image_data_uri.into(),
            question: question.into(),
            goal: None,
            history: None,
        }
    }

    pub fn with_goal(mut self, goal: GoalContext) -> Self {
        self.goal = Some(goal);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = Some(history);
        self
    }
}

/// What came back from the model, tagged by the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInvocationResult {
    /// Raw text from the screenshot Q&A path
    Answer(String),
    /// Validated steps from the step-generation path
    Steps(Vec<ParsedStep>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_context_wire_names() {
        let goal = GoalContext::new("Ship the app", "Writing tests").with_deadline("Friday");
        let json = serde_json::to_value(&goal).unwrap();

        assert_eq!(json["objective"], "Ship the app");
        assert_eq!(json["currentStatus"], "Writing tests");
        assert_eq!(json["deadline"], "Friday");
    }

    #[test]
    fn test_analysis_request_missing_fields_default_to_empty() {
        let request: AnalysisRequest = serde_json::from_str(r#"{"question": "why?"}"#).unwrap();

        assert!(request.image_data_uri.is_empty());
        assert_eq!(request.question, "why?");
        assert!(request.goal.is_none());
        assert!(request.history.is_none());
    }

    #[test]
    fn test_analysis_request_keeps_empty_history() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"image": "data:x", "question": "q", "history": []}"#).unwrap();

        assert_eq!(request.history, Some(vec![]));
    }
}
