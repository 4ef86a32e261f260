use reqwest::Url;
use std::time::Duration;

use crate::Error;

/// API version the Responses endpoint is pinned to.
pub const DEFAULT_API_VERSION: &str = "2025-11-15-preview";

/// Audience for Azure AI Foundry tokens.
pub const DEFAULT_SCOPE: &str = "https://ai.azure.com/.default";

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;

pub const DEFAULT_PROMPT: &str = "Write a one-sentence bedtime story about a unicorn.";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Validated settings for a [`ResponsesIssuer`](crate::ResponsesIssuer).
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    pub base_url: Url,
    pub api_version: String,
    pub scope: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl IssuerConfig {
    pub fn builder() -> IssuerConfigBuilder {
        IssuerConfigBuilder::default()
    }

    /// Shorthand for a config with every default except the base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        Self::builder().base_url(base_url).build()
    }
}

/// Builder for [`IssuerConfig`].
#[derive(Debug, Default, Clone)]
pub struct IssuerConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    scope: Option<String>,
    model: Option<String>,
    max_output_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl IssuerConfigBuilder {
    /// Base URL of the OpenAI-compatible surface, e.g.
    /// `https://<resource>.services.ai.azure.com/api/projects/<project>/openai`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<IssuerConfig, Error> {
        let raw_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::config("base URL is required (set --base-url or FOUNDRY_BASE_URL)")
            })?;

        let base_url = Url::parse(raw_url.trim())
            .map_err(|e| Error::config(format!("invalid base URL '{raw_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        if model.trim().is_empty() {
            return Err(Error::config("model must not be empty"));
        }

        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        if api_version.trim().is_empty() {
            return Err(Error::config("api-version must not be empty"));
        }

        let scope = self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        if scope.trim().is_empty() {
            return Err(Error::config("token scope must not be empty"));
        }

        let max_output_tokens = self
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);
        if max_output_tokens == 0 {
            return Err(Error::config("max output tokens must be greater than zero"));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }

        Ok(IssuerConfig {
            base_url,
            api_version,
            scope,
            model,
            max_output_tokens,
            timeout,
        })
    }
}
