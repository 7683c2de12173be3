pub mod analysis;
pub mod steps;
pub mod records;

pub use analysis::{AnalysisRequest, GoalContext, HistoryEntry, ModelInvocationResult};
pub use steps::{GoalStep, ParsedStep};
pub use records::{ConversationItem, Goal};
