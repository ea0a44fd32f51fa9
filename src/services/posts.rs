use std::{collections::BTreeMap, sync::Arc};

use tracing::{info, instrument, warn};

use crate::{
    models::posts::{Channel, Post, PostView, PublishedPost, STATUS_APPROVED, STATUS_PUBLISHED},
    repositories::posts_repo::PostsRepository,
    services::{content::ContentService, image::ImageService},
    Error, Result,
};

/// Orchestrates draft generation, image attachment and the post lifecycle.
#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn PostsRepository>,
    content: ContentService,
    images: ImageService,
    image_count: usize,
}

impl PostsService {
    pub fn new(
        repo: Arc<dyn PostsRepository>,
        content: ContentService,
        images: ImageService,
        image_count: usize,
    ) -> Self {
        Self {
            repo,
            content,
            images,
            image_count,
        }
    }

    /// Drafts are persisted before any image is requested. If the image batch
    /// fails the post stays behind with no images and the error is returned.
    #[instrument(skip(self))]
    pub async fn generate(&self, topics: &str, with_images: bool) -> Result<Post> {
        let drafts = self.content.generate_content(topics).await?;
        let topics = topics.trim();
        let mut post = self.repo.create_post(topics, &drafts).await?;
        info!(post_id = %post.id, "Post created");

        if with_images {
            let post_id = post.id.to_string();
            info!(post_id = %post_id, "Generating images");
            let images = self.images.generate_images(topics, self.image_count).await?;
            if !self.repo.update_images(&post_id, &images).await? {
                return Err(Error::post_not_found(&post_id));
            }
            post.images = images;
        }

        Ok(post)
    }

    /// Sets the status and returns the message shown to the caller.
    #[instrument(skip(self))]
    pub async fn approve(&self, post_id: &str, status: &str) -> Result<String> {
        let status = status.trim();
        if !self.repo.update_status(post_id, status).await? {
            warn!("Cannot update status, post not found");
            return Err(Error::post_not_found(post_id));
        }
        info!("Post status updated");

        if status.eq_ignore_ascii_case(STATUS_APPROVED) {
            Ok("Post approved successfully.".to_string())
        } else {
            Ok(format!("Post status updated to '{}'.", status))
        }
    }

    /// A request naming no known platform publishes nothing and leaves the
    /// stored status as it was.
    #[instrument(skip(self))]
    pub async fn publish(&self, post_id: &str, platforms: &[String]) -> Result<PublishedPost> {
        let post = self.find(post_id).await?;

        let mut selected = BTreeMap::new();
        for name in platforms {
            match Channel::from_name(name) {
                Some(channel) => {
                    selected.insert(channel.to_str(), post.payload(channel));
                }
                None => warn!(platform = %name, "Unknown platform skipped"),
            }
        }

        if selected.is_empty() {
            warn!("No known platform requested, status left unchanged");
            return Ok(PublishedPost {
                post_id: post.id,
                platforms: selected,
                images: post.images,
                status: post.status,
            });
        }

        if !self.repo.update_status(post_id, STATUS_PUBLISHED).await? {
            return Err(Error::post_not_found(post_id));
        }
        info!(platforms = selected.len(), "Post published");

        Ok(PublishedPost {
            post_id: post.id,
            platforms: selected,
            images: post.images,
            status: STATUS_PUBLISHED.to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: &str, platform: Option<&str>) -> Result<PostView> {
        let post = self.find(post_id).await?;

        let Some(platform) = platform.filter(|p| !p.trim().is_empty()) else {
            return Ok(PostView::Full {
                blog: post.blog,
                linkedin: post.linkedin,
                whatsapp: post.whatsapp,
                images: post.images,
                status: post.status,
            });
        };

        let channel = Channel::from_name(platform).ok_or_else(|| {
            warn!(platform, "Invalid platform requested");
            Error::BadRequest(format!(
                "Invalid platform '{}'. Expected one of: blog, linkedin, whatsapp.",
                platform.trim()
            ))
        })?;

        Ok(PostView::Channel {
            platform: channel,
            data: post.payload(channel),
            images: post.images,
            status: post.status,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_posts(&self, status: Option<&str>) -> Result<Vec<Post>> {
        let status = status.map(str::trim).filter(|s| !s.is_empty());
        let posts = self.repo.list_posts(status).await?;
        info!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    async fn find(&self, post_id: &str) -> Result<Post> {
        self.repo.get_post(post_id).await?.ok_or_else(|| {
            warn!(post_id, "Post not found");
            Error::post_not_found(post_id)
        })
    }
}
