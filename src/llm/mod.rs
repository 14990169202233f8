pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum LlmError {
    ConnectionError(String),
    ResponseError(String),
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            LlmError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            LlmError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
        }
    }
}

impl Error for LlmError {}

/// A text-completion capability. Implementations wrap one provider API;
/// which one is live gets decided once at startup.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
    fn name(&self) -> &str;
}

pub struct LlmManager {
    provider: Box<dyn TextCompletion>,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider: Box<dyn TextCompletion> = match config.provider.as_str() {
            "openai" => Box::new(providers::openai::OpenAiProvider::new(config)?),
            "gemini" => Box::new(providers::gemini::GeminiProvider::new(config)?),
            other => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported model provider: {}",
                    other
                )));
            }
        };

        Ok(Self { provider })
    }

    /// Wraps an already-built provider; used by tests to inject mocks.
    pub fn with_provider(provider: Box<dyn TextCompletion>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TextCompletion for LlmManager {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.provider.complete(prompt).await
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            openai_api_key: Some("sk-test".to_string()),
            gemini_api_key: Some("g-test".to_string()),
            openai_model: "gpt-4o".to_string(),
            gemini_model: "gemini-2.0-flash".to_string(),
        }
    }

    #[test]
    fn manager_binds_the_configured_provider() {
        assert_eq!(LlmManager::new(&llm_config("openai")).unwrap().name(), "openai");
        assert_eq!(LlmManager::new(&llm_config("gemini")).unwrap().name(), "gemini");
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        assert!(matches!(
            LlmManager::new(&llm_config("claude")),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn missing_key_for_selected_provider_is_a_config_error() {
        let mut config = llm_config("openai");
        config.openai_api_key = None;
        assert!(matches!(LlmManager::new(&config), Err(LlmError::ConfigError(_))));
    }
}
