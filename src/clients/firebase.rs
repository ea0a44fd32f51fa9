use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{IdentityProvider, IdentitySession, ProviderError};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts";

pub struct FirebaseIdentity {
    client: Client,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    id_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseIdentity {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    async fn call(
        &self,
        action: &str,
        email: &str,
        password: &str,
    ) -> Result<IdentitySession, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::NotConfigured("FIREBASE_API_KEY"))?;

        let response = self
            .client
            .post(format!("{}:{}", IDENTITY_TOOLKIT_URL, action))
            .query(&[("key", api_key)])
            .json(&CredentialsRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status.as_u16(), body));
        }

        let session: SessionResponse = serde_json::from_str(&body)?;
        let expires_in = session
            .expires_in
            .parse()
            .map_err(|_| ProviderError::Response(format!("invalid expiresIn '{}'", session.expires_in)))?;
        Ok(IdentitySession {
            id_token: session.id_token,
            expires_in,
        })
    }
}

// 4xx bodies carry a code like `EMAIL_EXISTS`.
fn rejection(status: u16, body: String) -> ProviderError {
    if (400..500).contains(&status) {
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            return ProviderError::Rejected(envelope.error.message);
        }
    }
    ProviderError::Api { status, body }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip(self, password), fields(provider = "firebase"))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<IdentitySession, ProviderError> {
        self.call("signUp", email, password).await
    }

    #[instrument(skip(self, password), fields(provider = "firebase"))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, ProviderError> {
        self.call("signInWithPassword", email, password).await
    }

    fn name(&self) -> &'static str {
        "Firebase Identity Toolkit"
    }
}
