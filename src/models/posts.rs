use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const STATUS_GENERATED: &str = "generated";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_PUBLISHED: &str = "published";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Blog,
    Linkedin,
    Whatsapp,
}

impl Channel {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Linkedin => "linkedin",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Case- and whitespace-insensitive lookup; `None` for unknown platforms.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "blog" => Some(Self::Blog),
            "linkedin" => Some(Self::Linkedin),
            "whatsapp" => Some(Self::Whatsapp),
            _ => None,
        }
    }
}

/// Title/content/tags draft used by the blog and LinkedIn channels.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub message: String,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drafts {
    pub blog: ChannelDraft,
    pub linkedin: ChannelDraft,
    pub whatsapp: MessageDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChannelPayload {
    Draft(ChannelDraft),
    Message(MessageDraft),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReference {
    #[serde(rename = "publicImageUrl", skip_serializing_if = "Option::is_none", default)]
    pub public_image_url: Option<String>,
    #[serde(rename = "googleDriveImageUrl")]
    pub google_drive_image_url: String,
    #[serde(rename = "googleDriveFileId")]
    pub google_drive_file_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    #[serde(rename = "postId")]
    pub id: Uuid,
    pub topic: String,
    pub blog: ChannelDraft,
    pub linkedin: ChannelDraft,
    pub whatsapp: MessageDraft,
    pub images: Vec<ImageReference>,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn payload(&self, channel: Channel) -> ChannelPayload {
        match channel {
            Channel::Blog => ChannelPayload::Draft(self.blog.clone()),
            Channel::Linkedin => ChannelPayload::Draft(self.linkedin.clone()),
            Channel::Whatsapp => ChannelPayload::Message(self.whatsapp.clone()),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct TopicInput {
    #[validate(custom(function = "not_blank", message = "At least one topic is required"))]
    pub topics: String,
    #[serde(default)]
    pub image_generated: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveIn {
    #[serde(rename = "postId")]
    #[validate(custom(function = "not_blank", message = "postId is required"))]
    pub post_id: String,
    #[validate(custom(function = "not_blank", message = "status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublishIn {
    #[serde(rename = "postId")]
    #[validate(custom(function = "not_blank", message = "postId is required"))]
    pub post_id: String,
    pub platforms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostIdQuery {
    #[validate(custom(function = "not_blank", message = "post_id is required"))]
    pub post_id: String,
    pub platform: Option<String>,
}

/// What `GET /post/id` returns: either every channel or a single one.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PostView {
    Full {
        blog: ChannelDraft,
        linkedin: ChannelDraft,
        whatsapp: MessageDraft,
        images: Vec<ImageReference>,
        status: String,
    },
    Channel {
        platform: Channel,
        data: ChannelPayload,
        images: Vec<ImageReference>,
        status: String,
    },
}

#[derive(Debug, Serialize)]
pub struct PublishedPost {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
    pub platforms: BTreeMap<&'static str, ChannelPayload>,
    pub images: Vec<ImageReference>,
    pub status: String,
}
