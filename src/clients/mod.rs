use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;

use crate::{config::Config, Error, Result};

pub mod calendar;
pub mod drive;
pub mod firebase;
pub mod google_auth;
pub mod groq;
pub mod openai;

pub use calendar::{CalendarEvent, GoogleCalendar};
pub use drive::GoogleDrive;
pub use firebase::FirebaseIdentity;
pub use groq::GroqChat;
pub use openai::OpenAiImages;

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },
    /// Safe to show to the caller.
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

pub(crate) async fn check_status(
    response: reqwest::Response,
) -> std::result::Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage])
        -> std::result::Result<String, ProviderError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Returns the base64 payload.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_id: String,
    pub public_url: String,
}

#[async_trait]
pub trait CloudStorage: Send + Sync {
    async fn upload(
        &self,
        local_path: &Path,
        filename: &str,
        content_type: &str,
    ) -> std::result::Result<StoredFile, ProviderError>;

    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait EventCalendar: Send + Sync {
    async fn insert_event(
        &self,
        event: &CalendarEvent,
    ) -> std::result::Result<String, ProviderError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySession {
    pub id_token: String,
    pub expires_in: i64,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<IdentitySession, ProviderError>;

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<IdentitySession, ProviderError>;

    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct ModelRegistry {
    pub chat: Arc<dyn LanguageModel>,
    pub images: Arc<dyn ImageProvider>,
    pub storage: Arc<dyn CloudStorage>,
    pub calendar: Arc<dyn EventCalendar>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl ModelRegistry {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let service_account = config
            .calendar
            .credentials_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| Error::Config(format!("GOOGLE_CREDENTIALS_JSON is not valid: {}", e)))?;

        Ok(Self {
            chat: Arc::new(GroqChat::new(
                http.clone(),
                config.groq_api_key.clone(),
                config.groq_model.clone(),
            )),
            images: Arc::new(OpenAiImages::new(
                http.clone(),
                config.openai_api_key.clone(),
                config.image_model.clone(),
                config.image_size.clone(),
            )),
            storage: Arc::new(GoogleDrive::new(http.clone(), config.drive.clone())),
            calendar: Arc::new(GoogleCalendar::new(
                http.clone(),
                service_account,
                config.calendar.calendar_id.clone(),
            )),
            identity: Arc::new(FirebaseIdentity::new(http, config.firebase_api_key.clone())),
        })
    }
}
