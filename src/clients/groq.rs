use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{check_status, ChatMessage, LanguageModel, ProviderError};

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const TEMPERATURE: f32 = 0.7;

pub struct GroqChat {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl GroqChat {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
            endpoint: GROQ_CHAT_URL.to_string(),
        }
    }
}

#[async_trait]
impl LanguageModel for GroqChat {
    #[instrument(skip(self, messages), fields(provider = "groq", model = %self.model))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let result: CompletionResponse = check_status(response).await?.json().await?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Response("completion has no content".to_string()))?;

        debug!(chars = content.len(), "Received completion");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
