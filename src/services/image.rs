use std::{path::PathBuf, sync::Arc};

use base64::{engine::general_purpose::STANDARD, Engine};
use futures::{stream, StreamExt, TryStreamExt};
use image::ImageFormat;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    clients::{CloudStorage, ImageProvider, ProviderError},
    models::posts::ImageReference,
    Error, Result,
};

#[derive(Clone)]
pub struct ImageService {
    images: Arc<dyn ImageProvider>,
    storage: Arc<dyn CloudStorage>,
    image_dir: PathBuf,
    public_base_url: String,
}

impl ImageService {
    pub fn new(
        images: Arc<dyn ImageProvider>,
        storage: Arc<dyn CloudStorage>,
        image_dir: PathBuf,
        public_base_url: String,
    ) -> Self {
        Self {
            images,
            storage,
            image_dir,
            public_base_url,
        }
    }

    /// Generates `count` banners for the topic, one provider call at a time.
    ///
    /// The first failure aborts the batch and no partial list is returned.
    #[instrument(skip(self))]
    pub async fn generate_images(&self, topic: &str, count: usize) -> Result<Vec<ImageReference>> {
        if topic.trim().is_empty() {
            return Err(Error::BadRequest("Topic is required".to_string()));
        }

        tokio::fs::create_dir_all(&self.image_dir).await?;
        let safe_topic = safe_file_stem(topic);
        let safe_topic = safe_topic.as_str();

        let images: Vec<ImageReference> = stream::iter(1..=count)
            .then(move |index| self.produce_image(topic, safe_topic, index))
            .try_collect()
            .await?;

        info!(count = images.len(), "Images generated and uploaded");
        Ok(images)
    }

    async fn produce_image(
        &self,
        topic: &str,
        safe_topic: &str,
        index: usize,
    ) -> Result<ImageReference> {
        let prompt = format!("Create modern social banner for: {}", topic);
        let encoded = self
            .images
            .generate(&prompt)
            .await
            .map_err(|e| self.image_failure(index, e))?;

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| self.image_failure(index, ProviderError::Response(e.to_string())))?;
        let format = image::guess_format(&bytes).unwrap_or(ImageFormat::Png);
        let extension = format.extensions_str().first().copied().unwrap_or("png");

        let filename = format!(
            "{}_{}_{}.{}",
            safe_topic,
            Uuid::now_v7().simple(),
            index,
            extension
        );
        let local_path = self.image_dir.join(&filename);
        tokio::fs::write(&local_path, &bytes).await?;

        let stored = self
            .storage
            .upload(&local_path, &filename, format.to_mime_type())
            .await
            .map_err(|e| {
                error!(index, filename = %filename, error = %e, "Image upload failed");
                Error::ExternalService {
                    provider: self.storage.name(),
                    source: e,
                }
            })?;

        Ok(ImageReference {
            public_image_url: Some(format!(
                "{}/{}",
                self.public_base_url.trim_end_matches('/'),
                filename
            )),
            google_drive_image_url: stored.public_url,
            google_drive_file_id: stored.file_id,
        })
    }

    fn image_failure(&self, index: usize, source: ProviderError) -> Error {
        error!(index, error = %source, "Image generation failed");
        Error::ExternalService {
            provider: self.images.name(),
            source,
        }
    }
}

/// Replaces every non-alphanumeric character so the topic is safe in a file name.
pub fn safe_file_stem(topic: &str) -> String {
    topic
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
