//! Free-text outfit advice from a chat completion model

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::OutfitAiError;
use crate::config::SuggestionConfig;
use crate::http;
use crate::models::{GarmentLabel, Temperature};

const SERVICE: &str = "OpenAI";

#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    async fn suggest(&self, label: &GarmentLabel, temperature: Temperature) -> Result<String>;
}

#[must_use]
pub fn build_prompt(label: &GarmentLabel, temperature: Temperature) -> String {
    format!(
        "My garment is {label}. The air temperature is {}°C. \
         Which outfit should I wear for these weather conditions?",
        temperature.celsius()
    )
}

pub struct OpenAiSuggestionClient {
    client: ClientWithMiddleware,
    api_key: String,
    url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl OpenAiSuggestionClient {
    pub fn new(config: &SuggestionConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            OutfitAiError::config(
                "Suggestion API key is required. Set suggestion.api_key or OPENAI_API_KEY",
            )
        })?;

        Ok(Self {
            client: http::build_client(config.timeout_seconds, config.max_retries)?,
            api_key,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl SuggestionGenerator for OpenAiSuggestionClient {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn suggest(&self, label: &GarmentLabel, temperature: Temperature) -> Result<String> {
        info!("Requesting outfit suggestion");

        let body = serde_json::to_vec(&ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(label, temperature),
            }],
        })?;

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| http::request_failed(SERVICE, e))?;
        let response = http::ensure_success(SERVICE, response).await?;
        let completion: ChatResponse = http::parse_json(SERVICE, response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| OutfitAiError::api("OpenAI returned no suggestion").into())
    }
}
