//! In-memory fakes for the repository and provider traits, plus a router
//! wired entirely from them.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    clients::{
        CalendarEvent, ChatMessage, CloudStorage, EventCalendar, IdentityProvider,
        IdentitySession, ImageProvider, LanguageModel, ProviderError, StoredFile,
    },
    models::posts::{Drafts, ImageReference, Post, STATUS_GENERATED},
    repositories::posts_repo::PostsRepository,
    routes::create_routes,
    services::{
        auth::AuthService, content::ContentService, events::EventsService, image::ImageService,
        posts::PostsService,
    },
    AppState, Result,
};

pub const DRAFTS_REPLY: &str = r#"```json
{
  "blog": {"title": "AI Trends", "content": "Where AI is heading.", "tags": ["ai", "trends"]},
  "linkedin": {"title": "AI at work", "content": "Three shifts to watch.", "tags": "ai, careers"},
  "whatsapp": {"message": "AI is moving fast, here is what matters."}
}
```"#;

/// Smallest byte sequence the `image` crate recognises as PNG.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[derive(Default)]
pub struct InMemoryPosts {
    posts: Mutex<Vec<Post>>,
}

impl InMemoryPosts {
    fn with_post<T>(&self, post_id: &str, f: impl FnOnce(&mut Post) -> T) -> Option<T> {
        let id = Uuid::parse_str(post_id.trim()).ok()?;
        let mut posts = self.posts.lock().unwrap();
        posts.iter_mut().find(|p| p.id == id).map(f)
    }
}

#[async_trait]
impl PostsRepository for InMemoryPosts {
    async fn create_post(&self, topic: &str, drafts: &Drafts) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            topic: topic.to_string(),
            blog: drafts.blog.clone(),
            linkedin: drafts.linkedin.clone(),
            whatsapp: drafts.whatsapp.clone(),
            images: Vec::new(),
            status: STATUS_GENERATED.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: &str) -> Result<Option<Post>> {
        Ok(self.with_post(post_id, |p| p.clone()))
    }

    async fn update_images(&self, post_id: &str, images: &[ImageReference]) -> Result<bool> {
        Ok(self
            .with_post(post_id, |p| {
                p.images = images.to_vec();
                p.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn update_status(&self, post_id: &str, status: &str) -> Result<bool> {
        Ok(self
            .with_post(post_id, |p| {
                p.status = status.to_string();
                p.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn list_posts(&self, status: Option<&str>) -> Result<Vec<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .rev()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }
}

pub struct FakeModel {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> std::result::Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(ProviderError::Api {
            status: 503,
            body: "model unavailable".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// Succeeds until the `fail_on`-th call (1-based), which fails.
pub struct FakeImages {
    fail_on: Option<usize>,
    calls: AtomicUsize,
}

impl FakeImages {
    pub fn succeeding() -> Self {
        Self {
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FakeImages {
    async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(ProviderError::Api {
                status: 400,
                body: "content policy violation".to_string(),
            });
        }
        Ok(STANDARD.encode(PNG_SIGNATURE))
    }

    fn name(&self) -> &'static str {
        "fake images"
    }
}

#[derive(Default)]
pub struct FakeStorage {
    fail: bool,
    uploaded: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            uploaded: Mutex::default(),
        }
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudStorage for FakeStorage {
    async fn upload(
        &self,
        _local_path: &Path,
        filename: &str,
        _content_type: &str,
    ) -> std::result::Result<StoredFile, ProviderError> {
        if self.fail {
            return Err(ProviderError::Api {
                status: 403,
                body: "insufficient permissions".to_string(),
            });
        }
        let mut uploaded = self.uploaded.lock().unwrap();
        uploaded.push(filename.to_string());
        let file_id = format!("file-{}", uploaded.len());
        Ok(StoredFile {
            public_url: format!("https://drive.google.com/uc?id={}", file_id),
            file_id,
        })
    }

    fn name(&self) -> &'static str {
        "fake storage"
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    fail: bool,
    events: Mutex<Vec<CalendarEvent>>,
}

impl FakeCalendar {
    pub fn failing() -> Self {
        Self {
            fail: true,
            events: Mutex::default(),
        }
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventCalendar for FakeCalendar {
    async fn insert_event(
        &self,
        event: &CalendarEvent,
    ) -> std::result::Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Api {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(format!("event-{}", events.len()))
    }

    fn name(&self) -> &'static str {
        "fake calendar"
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    failure: Option<ProviderError>,
}

impl FakeIdentity {
    pub fn rejecting(code: &str) -> Self {
        Self {
            failure: Some(ProviderError::Rejected(code.to_string())),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            failure: Some(ProviderError::Api {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }

    fn session(&self, email: &str) -> std::result::Result<IdentitySession, ProviderError> {
        match &self.failure {
            Some(ProviderError::Rejected(code)) => Err(ProviderError::Rejected(code.clone())),
            Some(_) => Err(ProviderError::Api {
                status: 503,
                body: "unavailable".to_string(),
            }),
            None => Ok(IdentitySession {
                id_token: format!("id-token-{}", email),
                expires_in: 3600,
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
    ) -> std::result::Result<IdentitySession, ProviderError> {
        self.session(email)
    }

    async fn sign_in(
        &self,
        email: &str,
        _password: &str,
    ) -> std::result::Result<IdentitySession, ProviderError> {
        self.session(email)
    }

    fn name(&self) -> &'static str {
        "fake identity"
    }
}

pub fn posts_service(
    repo: Arc<InMemoryPosts>,
    model: FakeModel,
    images: FakeImages,
) -> PostsService {
    let image_dir = std::env::temp_dir().join(format!("writer-agent-test-{}", Uuid::now_v7()));
    PostsService::new(
        repo,
        ContentService::new(Arc::new(model)),
        ImageService::new(
            Arc::new(images),
            Arc::new(FakeStorage::default()),
            image_dir,
            "/public/generated_images".to_string(),
        ),
        1,
    )
}

/// Full router backed by fakes that all succeed.
pub fn app() -> Router {
    let app_state = AppState {
        posts_service: posts_service(
            Arc::new(InMemoryPosts::default()),
            FakeModel::replying(DRAFTS_REPLY),
            FakeImages::succeeding(),
        ),
        auth_service: AuthService::new(Arc::new(FakeIdentity::default())),
        events_service: EventsService::new(
            Arc::new(FakeCalendar::default()),
            "Asia/Kolkata".to_string(),
        ),
    };
    create_routes(Arc::new(app_state), &std::env::temp_dir())
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
