// Persisted shapes owned by the storage collaborators (browser storage or the
// remote document store). The assistant only reads the goal/history parts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::HistoryEntry;
use crate::steps::GoalStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps: Vec<GoalStep>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_steps: Option<Vec<String>>,
}

impl From<&ConversationItem> for HistoryEntry {
    fn from(item: &ConversationItem) -> Self {
        HistoryEntry::new(item.question.clone(), item.answer.clone())
    }
}
