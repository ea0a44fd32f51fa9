use std::path::Path;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::{
    check_status,
    google_auth::{refresh_token_grant, TokenCache},
    CloudStorage, ProviderError, StoredFile,
};
use crate::config::DriveConfig;

const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files?uploadType=media";
const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

pub struct GoogleDrive {
    client: Client,
    config: DriveConfig,
    tokens: TokenCache,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

struct Credentials<'a> {
    folder_id: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

impl GoogleDrive {
    pub fn new(client: Client, config: DriveConfig) -> Self {
        Self {
            client,
            config,
            tokens: TokenCache::default(),
        }
    }

    fn credentials(&self) -> Result<Credentials<'_>, ProviderError> {
        Ok(Credentials {
            folder_id: self
                .config
                .folder_id
                .as_deref()
                .ok_or(ProviderError::NotConfigured("GOOGLE_DRIVE_FOLDER_ID"))?,
            client_id: self
                .config
                .client_id
                .as_deref()
                .ok_or(ProviderError::NotConfigured("GOOGLE_CLIENT_ID"))?,
            client_secret: self
                .config
                .client_secret
                .as_deref()
                .ok_or(ProviderError::NotConfigured("GOOGLE_CLIENT_SECRET"))?,
            refresh_token: self
                .config
                .refresh_token
                .as_deref()
                .ok_or(ProviderError::NotConfigured("GOOGLE_DRIVE_REFRESH_TOKEN"))?,
        })
    }

    async fn access_token(&self, creds: &Credentials<'_>) -> Result<String, ProviderError> {
        self.tokens
            .get_or_refresh(|| {
                refresh_token_grant(
                    &self.client,
                    creds.client_id,
                    creds.client_secret,
                    creds.refresh_token,
                )
            })
            .await
    }
}

pub fn public_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={}", file_id)
}

#[async_trait]
impl CloudStorage for GoogleDrive {
    #[instrument(skip(self, local_path, content_type), fields(provider = "google_drive"))]
    async fn upload(
        &self,
        local_path: &Path,
        filename: &str,
        content_type: &str,
    ) -> Result<StoredFile, ProviderError> {
        let creds = self.credentials()?;
        let token = self.access_token(&creds).await?;
        let bytes = tokio::fs::read(local_path).await?;

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        let file: DriveFile = check_status(response).await?.json().await?;

        // Media uploads land in the root with no name; move and rename in one call.
        let response = self
            .client
            .patch(format!("{}/{}", FILES_URL, file.id))
            .bearer_auth(&token)
            .query(&[("addParents", creds.folder_id)])
            .json(&json!({ "name": filename }))
            .send()
            .await?;
        check_status(response).await?;

        let response = self
            .client
            .post(format!("{}/{}/permissions", FILES_URL, file.id))
            .bearer_auth(&token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;
        check_status(response).await?;

        info!(file_id = %file.id, "Uploaded image to Google Drive");
        Ok(StoredFile {
            public_url: public_url(&file.id),
            file_id: file.id,
        })
    }

    fn name(&self) -> &'static str {
        "Google Drive"
    }
}
