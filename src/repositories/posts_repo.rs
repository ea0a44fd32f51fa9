use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    models::posts::{ChannelDraft, Drafts, ImageReference, MessageDraft, Post, STATUS_GENERATED},
    Result,
};

use super::PostgresRepo;

/// Post ids are accepted as raw strings; anything that is not a UUID simply
/// matches no row.
#[async_trait]
pub trait PostsRepository: Sync + Send {
    async fn create_post(&self, topic: &str, drafts: &Drafts) -> Result<Post>;
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>>;
    async fn update_images(&self, post_id: &str, images: &[ImageReference]) -> Result<bool>;
    async fn update_status(&self, post_id: &str, status: &str) -> Result<bool>;
    /// Newest first, optionally restricted to one status.
    async fn list_posts(&self, status: Option<&str>) -> Result<Vec<Post>>;
}

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    topic: String,
    blog: Json<ChannelDraft>,
    linkedin: Json<ChannelDraft>,
    whatsapp: Json<MessageDraft>,
    images: Json<Vec<ImageReference>>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            topic: row.topic,
            blog: row.blog.0,
            linkedin: row.linkedin.0,
            whatsapp: row.whatsapp.0,
            images: row.images.0,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const POST_COLUMNS: &str =
    "id, topic, blog, linkedin, whatsapp, images, status, created_at, updated_at";

#[async_trait]
impl PostsRepository for PostgresRepo {
    #[instrument(skip(self, drafts))]
    async fn create_post(&self, topic: &str, drafts: &Drafts) -> Result<Post> {
        let id = Uuid::now_v7();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts (id, topic, blog, linkedin, whatsapp, images, status)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb, $6)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(topic)
        .bind(Json(&drafts.blog))
        .bind(Json(&drafts.linkedin))
        .bind(Json(&drafts.whatsapp))
        .bind(STATUS_GENERATED)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        let Ok(id) = Uuid::parse_str(post_id.trim()) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    #[instrument(skip(self, images), fields(count = images.len()))]
    async fn update_images(&self, post_id: &str, images: &[ImageReference]) -> Result<bool> {
        let Ok(id) = Uuid::parse_str(post_id.trim()) else {
            return Ok(false);
        };
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET images = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(images))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn update_status(&self, post_id: &str, status: &str) -> Result<bool> {
        let Ok(id) = Uuid::parse_str(post_id.trim()) else {
            return Ok(false);
        };
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, status: Option<&str>) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }
}
