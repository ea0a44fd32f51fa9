use std::time::{Duration, Instant};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{check_status, ProviderError};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct TokenCache {
    current: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    // Lock held across the fetch so concurrent callers share one refresh.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<String, ProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<(String, u64), ProviderError>>,
    {
        let mut current = self.current.lock().await;
        if let Some(token) = current.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let (value, expires_in) = fetch().await?;
        *current = Some(AccessToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        });
        Ok(value)
    }
}

pub async fn refresh_token_grant(
    client: &Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<(String, u64), ProviderError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
    ];
    let response = client.post(GOOGLE_TOKEN_URL).form(&params).send().await?;
    let token: TokenResponse = check_status(response).await?.json().await?;

    debug!(expires_in = token.expires_in, "Refreshed user access token");
    Ok((token.access_token, token.expires_in))
}

pub async fn service_account_grant(
    client: &Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<(String, u64), ProviderError> {
    let assertion = sign_assertion(key, scope, chrono::Utc::now().timestamp())?;
    let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
    let response = client.post(&key.token_uri).form(&params).send().await?;
    let token: TokenResponse = check_status(response).await?.json().await?;

    debug!(account = %key.client_email, "Obtained service account access token");
    Ok((token.access_token, token.expires_in))
}

fn sign_assertion(key: &ServiceAccountKey, scope: &str, now: i64) -> Result<String, ProviderError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
}
