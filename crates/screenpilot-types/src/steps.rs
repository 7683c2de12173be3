use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A step exactly as validated from model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStep {
    pub title: String,
    pub description: String,
}

impl ParsedStep {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A step as stored on a goal, with identity and progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GoalStep {
    /// Attach a fresh id and `completed: false` to a parsed step
    pub fn from_parsed(step: ParsedStep) -> Self {
        Self {
            id: format!("step-{}", Uuid::new_v4()),
            title: step.title,
            description: step.description,
            completed: false,
            completed_at: None,
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }
}

impl From<ParsedStep> for GoalStep {
    fn from(step: ParsedStep) -> Self {
        Self::from_parsed(step)
    }
}
