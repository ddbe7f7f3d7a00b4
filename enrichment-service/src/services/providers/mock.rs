//! Mock provider implementation for testing and offline runs.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted text provider.
///
/// Each rule pairs a needle with a reply; the first rule whose needle occurs
/// in the prompt answers. Prompts without a matching rule get the fallback
/// reply, or an error when none is set.
#[derive(Default)]
pub struct MockTextProvider {
    rules: Vec<(String, Result<String, String>)>,
    fallback: Option<String>,
    unhealthy: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts containing `needle` with `reply`.
    pub fn with_reply(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Ok(reply.into())));
        self
    }

    /// Fail prompts containing `needle` with an API error.
    pub fn with_failure(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Err(message.into())));
        self
    }

    /// Reply used when no rule matches.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    /// Fail health checks with `message`.
    pub fn unhealthy(mut self, message: impl Into<String>) -> Self {
        self.unhealthy = Some(message.into());
        self
    }

    /// Every prompt received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let scripted = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        let text = match scripted {
            Some(Ok(reply)) => reply,
            Some(Err(message)) => return Err(ProviderError::ApiError(message)),
            None => self.fallback.clone().ok_or_else(|| {
                ProviderError::NotConfigured("No scripted reply for prompt".to_string())
            })?,
        };

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text: Some(text),
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.unhealthy {
            Some(message) => Err(ProviderError::ApiError(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_matching_rule_answers() {
        let provider = MockTextProvider::new()
            .with_reply("email body", "Username: alice")
            .with_reply("receipt", "Transaction ID: T1");

        let response = provider
            .generate("details from the receipt", &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(response.text.as_deref(), Some("Transaction ID: T1"));
        assert_eq!(provider.prompts(), vec!["details from the receipt"]);
    }

    #[tokio::test]
    async fn unmatched_prompt_without_fallback_fails() {
        let provider = MockTextProvider::new();
        let result = provider
            .generate("anything", &GenerationParams::default())
            .await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn scripted_failure_is_an_api_error() {
        let provider = MockTextProvider::new().with_failure("receipt", "quota exceeded");
        let result = provider
            .generate("the receipt", &GenerationParams::default())
            .await;
        assert!(matches!(result, Err(ProviderError::ApiError(m)) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn health_follows_the_scripted_state() {
        assert!(MockTextProvider::new().health_check().await.is_ok());
        let result = MockTextProvider::new().unhealthy("down").health_check().await;
        assert!(matches!(result, Err(ProviderError::ApiError(m)) if m == "down"));
    }
}
