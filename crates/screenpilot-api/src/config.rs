use config::{Config as ConfigLoader, ConfigError, Environment, File};
use screenpilot_core::{AssistantConfig, RateLimitPolicy};
use screenpilot_llm::GeminiConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub gemini_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    /// Budget for one model call, enforced by both the HTTP client and the assistant
    pub timeout_ms: u64,
    /// Override for the Gemini endpoint (tests, proxies)
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub daily_limit: u32,
    pub per_minute: u32,
    /// Records untouched for this long are dropped
    pub idle_ttl_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let policy = RateLimitPolicy::default();
        Self {
            daily_limit: policy.daily_limit,
            per_minute: policy.per_minute,
            idle_ttl_secs: screenpilot_core::rate_limit::DEFAULT_IDLE_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (`SCREENPILOT_` prefix, `__` between section and key)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // SCREENPILOT_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCREENPILOT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.gemini_api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            ConfigError::Message("GEMINI_API_KEY environment variable is required".to_string())
        })?;

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm.timeout_ms)
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        let config = GeminiConfig::new(&self.gemini_api_key).with_timeout(self.llm_timeout());
        match &self.llm.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig::new(&self.llm.model).with_timeout(self.llm_timeout())
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            daily_limit: self.rate_limit.daily_limit,
            per_minute: self.rate_limit.per_minute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 3000

        [cors]
        enabled = true
        origins = ["http://localhost:3000"]

        [llm]
        model = "gemini-2.5-flash"
        timeout_ms = 8000

        [rate_limit]
        daily_limit = 20
        per_minute = 2
        idle_ttl_secs = 3600

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(TOML).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert!(config.llm.base_url.is_none());
        assert!(config.gemini_api_key.is_empty());
    }

    #[test]
    fn test_derived_settings() {
        let config: Config = toml::from_str(TOML).unwrap();

        let policy = config.rate_limit_policy();
        assert_eq!(policy.daily_limit, 20);
        assert_eq!(policy.min_spacing(), chrono::Duration::seconds(30));

        assert_eq!(config.assistant_config().timeout, Duration::from_millis(8000));
        assert_eq!(config.gemini_config().timeout, Duration::from_millis(8000));
    }

    #[test]
    fn test_rate_limit_section_optional() {
        let without = TOML.replace("[rate_limit]", "[unused]");
        let config: Config = toml::from_str(&without).unwrap();
        assert_eq!(config.rate_limit.daily_limit, 50);
        assert_eq!(config.rate_limit.per_minute, 5);
    }
}
