use screenpilot_llm::{GenerateRequest, GenerativeClient, InlineImage};
use screenpilot_types::{AnalysisRequest, ModelInvocationResult, ParsedStep};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AssistError, Result};
use crate::image::{decode_image, validate_input};
use crate::prompt::{compose_prompt, compose_step_prompt, PromptContext};
use crate::rate_limit::{Quota, RateLimiter};
use crate::steps::{fallback_steps, parse_steps};

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub model: String,
    /// Upper bound for a single model call
    pub timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: screenpilot_llm::config::DEFAULT_MODEL.to_string(),
            timeout: screenpilot_llm::config::DEFAULT_TIMEOUT,
        }
    }
}

impl AssistantConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Successful screenshot answer plus the quota seen at the rate-limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub response: String,
    pub quota: Quota,
}

/// Validated input for step generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRequest {
    pub goal_title: String,
    pub description: Option<String>,
}

impl StepRequest {
    pub fn new(goal_title: impl Into<String>, description: Option<String>) -> Result<Self> {
        let goal_title = goal_title.into();
        if goal_title.trim().is_empty() {
            return Err(AssistError::MissingGoalTitle);
        }
        Ok(Self {
            goal_title,
            description,
        })
    }
}

/// Step generation failed and the canned list was substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackUsed {
    pub reason: AssistError,
    pub steps: Vec<ParsedStep>,
}

impl FallbackUsed {
    fn new(reason: AssistError) -> Self {
        Self {
            reason,
            steps: fallback_steps(),
        }
    }

    /// Caller-facing error text sent alongside the fallback list
    pub fn message(&self) -> String {
        format!("ステップ生成でエラーが発生しました: {}", self.reason.detail())
    }
}

/// A single model call, tagged by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Screenshot question with its composed prompt
    Answer { prompt: String, image: InlineImage },
    /// Step generation with search grounding
    Steps { prompt: String },
}

/// Entry point for every model invocation.
///
/// Cheap to share behind an `Arc`; the only state shared between requests is
/// the rate limiter's per-identifier records.
pub struct Assistant {
    client: Arc<dyn GenerativeClient>,
    rate_limiter: RateLimiter,
    config: AssistantConfig,
}

impl Assistant {
    pub fn new(
        client: Arc<dyn GenerativeClient>,
        rate_limiter: RateLimiter,
        config: AssistantConfig,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            config,
        }
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn GenerativeClient> {
        &self.client
    }

    /// Answer a screenshot question.
    ///
    /// Rate limit, then input validation, then the model call. Denied or
    /// invalid requests never reach the model.
    pub async fn analyze(&self, identifier: &str, request: AnalysisRequest) -> Result<Analysis> {
        let quota = self.check_quota(identifier)?;
        self.analyze_with_quota(quota, request).await
    }

    /// Rate-limit gate on its own, for callers that must count a request
    /// before its body is known to be well formed.
    pub fn check_quota(&self, identifier: &str) -> Result<Quota> {
        let decision = self.rate_limiter.check(identifier);
        match decision.violation {
            Some(violation) => Err(AssistError::RateLimited {
                violation,
                quota: decision.quota(),
            }),
            None => Ok(decision.quota()),
        }
    }

    /// Second half of [`Assistant::analyze`] once the request has been admitted
    pub async fn analyze_with_quota(
        &self,
        quota: Quota,
        request: AnalysisRequest,
    ) -> Result<Analysis> {
        // 1. Validate and decode
        validate_input(&request.image_data_uri, &request.question)?;
        let image = decode_image(&request.image_data_uri)?;

        // 2. Compose prompt
        let context = PromptContext::from_request(request.goal, request.history);
        let prompt = compose_prompt(&request.question, &context);

        tracing::info!(
            mime_type = %image.mime_type,
            image_bytes = image.data.len(),
            goal_directed = context.is_goal_directed(),
            remaining = quota.remaining,
            "Analyzing screenshot"
        );

        // 3. Invoke model
        let response = self
            .answer(prompt, InlineImage::new(image.mime_type, image.data))
            .await?;

        Ok(Analysis { response, quota })
    }

    /// Break a goal into steps with search grounding.
    ///
    /// Never fails hard: any model or parse error yields [`FallbackUsed`]
    /// carrying the canned list.
    pub async fn generate_steps(
        &self,
        request: StepRequest,
    ) -> std::result::Result<Vec<ParsedStep>, FallbackUsed> {
        tracing::info!(goal_title = %request.goal_title, "Generating steps");

        let prompt = compose_step_prompt(&request.goal_title, request.description.as_deref());

        match self.steps(prompt).await {
            Ok(steps) => {
                tracing::info!(count = steps.len(), "Generated steps");
                Ok(steps)
            }
            Err(reason) => {
                tracing::warn!(error = %reason.detail(), "Step generation failed, using fallback");
                Err(FallbackUsed::new(reason))
            }
        }
    }

    /// Run one tagged invocation without rate limiting or fallback
    pub async fn invoke(&self, invocation: Invocation) -> Result<ModelInvocationResult> {
        match invocation {
            Invocation::Answer { prompt, image } => {
                self.answer(prompt, image).await.map(ModelInvocationResult::Answer)
            }
            Invocation::Steps { prompt } => {
                self.steps(prompt).await.map(ModelInvocationResult::Steps)
            }
        }
    }

    async fn answer(&self, prompt: String, image: InlineImage) -> Result<String> {
        let request = GenerateRequest::new(&self.config.model, prompt).with_image(image);
        self.call_model(request).await
    }

    async fn steps(&self, prompt: String) -> Result<Vec<ParsedStep>> {
        let request = GenerateRequest::new(&self.config.model, prompt).with_search_grounding(true);
        let text = self.call_model(request).await?;
        parse_steps(&text)
    }

    async fn call_model(&self, request: GenerateRequest) -> Result<String> {
        let start = Instant::now();
        let timeout = self.config.timeout;

        let text = match tokio::time::timeout(timeout, self.client.generate(request)).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!(error = %e, "Model invocation failed");
                AssistError::from(e)
            })?,
            Err(_) => {
                tracing::error!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Model invocation timed out"
                );
                return Err(AssistError::Timeout);
            }
        };

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = text.len(),
            "Model responded"
        );

        Ok(text)
    }
}
