use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{check_status, ImageProvider, ProviderError};

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

pub struct OpenAiImages {
    client: Client,
    api_key: String,
    model: String,
    size: String,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

impl OpenAiImages {
    pub fn new(client: Client, api_key: String, model: String, size: String) -> Self {
        Self {
            client,
            api_key,
            model,
            size,
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImages {
    #[instrument(skip(self, prompt), fields(provider = "openai", model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ImageRequest {
            model: &self.model,
            prompt,
            size: &self.size,
            n: 1,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(OPENAI_IMAGES_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let result: ImageResponse = check_status(response).await?.json().await?;

        result
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .ok_or_else(|| ProviderError::Response("image generation returned empty data".to_string()))
    }

    fn name(&self) -> &'static str {
        "OpenAI image generation"
    }
}
