use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::LlmConfig;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::ReportContext;
use crate::shared::prompts::{render_legal_report_prompt, render_legal_report_system_prompt};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Error)]
enum CompletionError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("response contained no choices")]
    NoChoices,
}

/// Writes the HTML legal report through an OpenAI-compatible chat completion API
pub struct SynthesisService {
    client: reqwest::Client,
    config: LlmConfig,
}

impl SynthesisService {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Render the prompt for `context` and return the model's HTML, trimmed.
    ///
    /// One request, no retry. Every failure surfaces as
    /// `ExternalServiceError("Error generating report: ...")`.
    pub async fn generate_report(&self, context: &ReportContext) -> Result<String> {
        let system = render_legal_report_system_prompt()
            .map_err(|e| AppError::Internal(format!("Failed to render system prompt: {}", e)))?;
        let prompt = render_legal_report_prompt(context)
            .map_err(|e| AppError::Internal(format!("Failed to render report prompt: {}", e)))?;

        tracing::info!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Requesting report synthesis"
        );

        let html = self.complete(&system, &prompt).await.map_err(|e| {
            tracing::warn!("Report synthesis failed: {}", e);
            AppError::ExternalServiceError(format!("Error generating report: {}", e))
        })?;

        tracing::info!(html_chars = html.len(), "Report synthesized");
        Ok(html)
    }

    async fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> std::result::Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.config.api_url);
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.without_url().to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default().trim().to_string())
            .ok_or(CompletionError::NoChoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{ClientContext, DamagesContext};
    use crate::features::research::ResearchFindings;
    use crate::shared::test_helpers::llm_config;
    use mockito::Matcher;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn context() -> ReportContext {
        ReportContext::new(
            ClientContext {
                client_name: "Dana Whitfield".to_string(),
                incident_date: "2024-03-18".to_string(),
                contact_info: Some("dana@example.com".to_string()),
            },
            "Slipped on a wet floor at a grocery store.".to_string(),
            &[],
            DamagesContext::new(Decimal::from(100), Decimal::ZERO, Decimal::ZERO),
            "Arizona".to_string(),
            ResearchFindings::default(),
        )
    }

    #[tokio::test]
    async fn test_returns_trimmed_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-llm-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4",
                "max_tokens": 4000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [
                        {"message": {"role": "assistant", "content": "\n  <html><body><h1>Legal Report</h1></body></html>\n\n"}},
                        {"message": {"role": "assistant", "content": "<p>second</p>"}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let service = SynthesisService::new(llm_config(&server.url())).unwrap();
        let html = service.generate_report(&context()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(html, "<html><body><h1>Legal Report</h1></body></html>");
    }

    #[tokio::test]
    async fn test_prompt_is_sent_as_user_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(
                "Client Name: Dana Whitfield".to_string(),
            ))
            .with_status(200)
            .with_body(json!({"choices": [{"message": {"content": "<p>ok</p>"}}]}).to_string())
            .create_async()
            .await;

        let service = SynthesisService::new(llm_config(&server.url())).unwrap();
        service.generate_report(&context()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_is_external_service_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let service = SynthesisService::new(llm_config(&server.url())).unwrap();
        match service.generate_report(&context()).await {
            Err(AppError::ExternalServiceError(msg)) => {
                assert!(msg.starts_with("Error generating report: "), "{}", msg);
                assert!(msg.contains("500"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let service = SynthesisService::new(llm_config(&server.url())).unwrap();
        let err = service.generate_report(&context()).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalServiceError(_)));
    }
}
