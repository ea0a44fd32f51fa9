use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument};

use crate::{
    clients::{ChatMessage, LanguageModel, ProviderError, Role},
    models::posts::Drafts,
    services::normalizer::normalize_drafts,
    Error, Result,
};

const SYSTEM_PROMPT: &str = "You are a professional AI marketing content creator. \
Your goal is to generate *high-quality, original, and engaging content* for different platforms. \
Each output must follow a strict JSON schema and maintain factual, concise, and audience-appropriate tone. \
Avoid repetition and unnecessary verbosity.";

const USER_PROMPT: &str = r#"Generate marketing drafts for these topics: {topics}

Create three distinct pieces of content for:
1. Blog (educational & SEO-optimized)
2. LinkedIn post (professional tone)
3. WhatsApp message (short, conversational tone)

Follow this STRICT JSON schema:
{
  "blog": {
     "title": string,
     "content": string,
     "tags": [string, string, ...]
  },
  "linkedin": {
     "title": string,
     "content": string,
     "tags": [string, string, ...]
  },
  "whatsapp": {
     "message": string
  }
}

Ensure both blog and LinkedIn outputs always have **title**, **content**, and **tags** keys. Do not use 'description' or other keys. Return ONLY valid JSON, no markdown or commentary."#;

/// Produces the three channel drafts for a topic with one model call.
#[derive(Clone)]
pub struct ContentService {
    model: Arc<dyn LanguageModel>,
}

impl ContentService {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    #[instrument(skip(self), fields(model = %self.model.model_name()))]
    pub async fn generate_content(&self, topics: &str) -> Result<Drafts> {
        let topics = topics.trim();
        if topics.is_empty() {
            return Err(Error::BadRequest("Topic is required".to_string()));
        }

        info!("Generating drafts");
        let reply = self
            .model
            .complete(&build_prompt(topics))
            .await
            .map_err(|e| {
                error!(error = %e, "Draft generation call failed");
                Error::Generation(e)
            })?;

        let raw = extract_json(&reply).map_err(|e| {
            error!(error = %e, "Model reply is not valid JSON");
            Error::Generation(e)
        })?;

        info!("Drafts generated and normalized");
        Ok(normalize_drafts(&raw))
    }
}

pub fn build_prompt(topics: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(Role::System, SYSTEM_PROMPT),
        ChatMessage::new(Role::User, USER_PROMPT.replace("{topics}", topics)),
    ]
}

/// Parses the model reply as JSON, falling back to the outermost `{...}`
/// span when the object is wrapped in code fences or prose.
fn extract_json(reply: &str) -> std::result::Result<Value, ProviderError> {
    let trimmed = reply.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            Ok(serde_json::from_str(&trimmed[start..=end])?)
        }
        _ => Err(ProviderError::Response(
            "model reply contains no JSON object".to_string(),
        )),
    }
}
