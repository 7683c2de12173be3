use screenpilot_core::{Assistant, GenerativeClient, MokaRateLimitStore, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The assistant owns the rate-limit records, so one instance must serve
/// every request for limits to hold.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn GenerativeClient>) -> Self {
        let store = MokaRateLimitStore::new(Duration::from_secs(config.rate_limit.idle_ttl_secs));
        let rate_limiter = RateLimiter::with_store(Arc::new(store), config.rate_limit_policy());
        let assistant = Assistant::new(client, rate_limiter, config.assistant_config());

        Self {
            config: Arc::new(config),
            assistant: Arc::new(assistant),
        }
    }
}
