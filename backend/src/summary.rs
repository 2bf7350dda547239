use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::{StepKind, SummaryStep};

use crate::error::AppError;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const FALLBACK_SUMMARY: &str = "Here's your tour!";
const PROMPT_PREFIX: &str = "Write a friendly one-sentence travel itinerary summary for this tour: ";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote text completion used to describe a tour.
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Completion text for `prompt`, `None` when the service returned nothing.
    async fn complete(&self, prompt: &str) -> Result<Option<String>, AppError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, AppError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl SummaryService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, AppError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response: ChatResponse = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

/// Prompt listing every named stop as `Name (description)`.
///
/// Travel hops are skipped; steps without a type are treated as stops.
pub fn summary_prompt(steps: &[SummaryStep]) -> String {
    let stops = steps
        .iter()
        .filter(|step| matches!(step.kind, None | Some(StepKind::Poi)))
        .filter(|step| !step.name.is_empty() && !step.description.is_empty())
        .map(|step| format!("{} ({})", step.name, step.description))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{PROMPT_PREFIX}{stops}")
}

pub async fn summarize(service: &dyn SummaryService, steps: &[SummaryStep]) -> Result<String, AppError> {
    let prompt = summary_prompt(steps);
    tracing::debug!("requesting summary for {} steps", steps.len());

    let summary = service
        .complete(&prompt)
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());

    Ok(summary)
}
