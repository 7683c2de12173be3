pub mod assistant;
pub mod error;
pub mod image;
pub mod prompt;
pub mod rate_limit;
pub mod steps;

pub use assistant::{Analysis, Assistant, AssistantConfig, FallbackUsed, Invocation, StepRequest};
pub use error::{AssistError, Result};
pub use image::{decode_image, validate_input, DecodedImage};
pub use prompt::{compose_prompt, compose_step_prompt, PromptContext};
pub use rate_limit::{
    MokaRateLimitStore, Quota, RateLimitDecision, RateLimitPolicy, RateLimitRecord,
    RateLimitStore, RateLimitViolation, RateLimiter,
};
pub use steps::{fallback_steps, parse_steps};

// Re-export the types and client seam callers need
pub use screenpilot_llm::{GenerateRequest, GenerativeClient, InlineImage, ModelError};
pub use screenpilot_types::{
    AnalysisRequest, GoalContext, HistoryEntry, ModelInvocationResult, ParsedStep,
};
