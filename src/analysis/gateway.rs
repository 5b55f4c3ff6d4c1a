//! AI analysis gateway — prompt, single provider attempt, parse, fall back.
//!
//! **Core invariant: every operation returns a structurally complete result.**
//! Provider errors, timeouts, missing JSON, and coercion failures all resolve
//! to the fallback catalog entry for that kind. Nothing here returns `Err`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::llm::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, ImageAttachment, LlmProvider,
};

use super::model::{
    AnswerSet, FoodAnalysis, HealthIndicatorAnalysis, InsightsRequest, PersonalizedInsights,
    WellnessAnalysis,
};
use super::normalize::{Normalize, try_parse_or_default};
use super::prompts;

/// Token and sampling limits per call.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub wellness_max_tokens: u32,
    pub food_max_tokens: u32,
    pub health_max_tokens: u32,
    pub insights_max_tokens: u32,
    pub temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            wellness_max_tokens: 1024,
            food_max_tokens: 1000,
            health_max_tokens: 800,
            insights_max_tokens: 800,
            temperature: 0.4,
        }
    }
}

/// Routes each analysis kind to its configured provider.
///
/// Holds no mutable state, so one gateway is shared by every session.
pub struct AnalysisGateway {
    /// Text provider for wellness scoring and insights.
    text_llm: Arc<dyn LlmProvider>,
    /// Multimodal provider for photo analyses.
    vision_llm: Arc<dyn LlmProvider>,
    config: GatewayConfig,
}

impl AnalysisGateway {
    pub fn new(
        text_llm: Arc<dyn LlmProvider>,
        vision_llm: Arc<dyn LlmProvider>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            text_llm,
            vision_llm,
            config,
        }
    }

    /// Score a completed questionnaire.
    pub async fn analyze_wellness(&self, answers: &AnswerSet) -> WellnessAnalysis {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::wellness_prompt(answers)),
        ])
        .with_max_tokens(self.config.wellness_max_tokens)
        .with_temperature(self.config.temperature);

        self.run(self.text_llm.as_ref(), request).await
    }

    /// Estimate nutrition from a food photo. `image` is raw decoded bytes.
    pub async fn analyze_food(&self, image: Vec<u8>) -> FoodAnalysis {
        let request = CompletionRequest::new(vec![
            ChatMessage::user(prompts::food_prompt()).with_image(ImageAttachment::from_bytes(image)),
        ])
        .with_max_tokens(self.config.food_max_tokens)
        .with_temperature(self.config.temperature);

        self.run(self.vision_llm.as_ref(), request).await
    }

    /// Observe visible wellness indicators in a selfie. `image` is raw decoded bytes.
    pub async fn analyze_health_indicators(&self, image: Vec<u8>) -> HealthIndicatorAnalysis {
        let request = CompletionRequest::new(vec![
            ChatMessage::user(prompts::health_indicators_prompt())
                .with_image(ImageAttachment::from_bytes(image)),
        ])
        .with_max_tokens(self.config.health_max_tokens)
        .with_temperature(self.config.temperature);

        self.run(self.vision_llm.as_ref(), request).await
    }

    /// Trend insights over a user's recent scores.
    pub async fn generate_insights(&self, input: &InsightsRequest) -> PersonalizedInsights {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::SYSTEM_PROMPT),
            ChatMessage::user(prompts::insights_prompt(input)),
        ])
        .with_max_tokens(self.config.insights_max_tokens)
        .with_temperature(self.config.temperature);

        self.run(self.text_llm.as_ref(), request).await
    }

    /// One bounded provider attempt, then parse-or-fallback.
    async fn run<T: Normalize>(&self, llm: &dyn LlmProvider, request: CompletionRequest) -> T {
        info!(kind = %T::KIND, provider = llm.name(), model = llm.model_name(), "Requesting analysis");

        match call_with_timeout(llm, request).await {
            Ok(response) => {
                debug!(
                    kind = %T::KIND,
                    chars = response.content.len(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Provider replied"
                );
                if response.finish_reason == FinishReason::Length {
                    warn!(kind = %T::KIND, "Provider reply hit the token limit");
                }
                try_parse_or_default(&response.content)
            }
            Err(e) => {
                warn!(kind = %T::KIND, error = %e, "Provider call failed, using fallback");
                T::fallback().clone()
            }
        }
    }
}

/// Invoke the provider once, bounded by its own timeout.
async fn call_with_timeout(
    llm: &dyn LlmProvider,
    request: CompletionRequest,
) -> Result<CompletionResponse, LlmError> {
    let timeout = llm.request_timeout();
    match tokio::time::timeout(timeout, llm.complete(request)).await {
        Ok(result) => result,
        Err(_) => Err(LlmError::Timeout {
            provider: llm.name().to_string(),
            timeout,
        }),
    }
}
