use std::sync::Arc;

use axum::{
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    models::{
        posts::{ApproveIn, PostIdQuery, PostsQuery, PublishIn, TopicInput},
        response::Response,
    },
    AppState, Error, Result,
};

pub fn agent_handler() -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/approve", put(approve))
        .route("/publish", post(publish))
        .route("/posts", get(list_posts))
        .route("/post/id", get(get_post))
}

async fn generate(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<TopicInput>, Error>,
) -> Result<impl IntoResponse> {
    input.validate()?;

    let post = app_state
        .posts_service
        .generate(&input.topics, input.image_generated)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Response::success("Content generated successfully.", post)),
    ))
}

async fn approve(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<ApproveIn>, Error>,
) -> Result<impl IntoResponse> {
    input.validate()?;

    let message = app_state
        .posts_service
        .approve(&input.post_id, &input.status)
        .await?;

    Ok(Json(Response::message(message)))
}

async fn publish(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(input), _): WithRejection<Json<PublishIn>, Error>,
) -> Result<impl IntoResponse> {
    input.validate()?;

    let published = app_state
        .posts_service
        .publish(&input.post_id, &input.platforms)
        .await?;

    Ok(Json(Response::success("Published successfully", published)))
}

async fn list_posts(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<PostsQuery>, Error>,
) -> Result<impl IntoResponse> {
    let posts = app_state
        .posts_service
        .list_posts(query.status.as_deref())
        .await?;

    let message = if posts.is_empty() {
        "No posts found."
    } else {
        "Posts fetched successfully."
    };
    Ok(Json(Response::success(message, posts)))
}

async fn get_post(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<PostIdQuery>, Error>,
) -> Result<impl IntoResponse> {
    query.validate()?;

    let view = app_state
        .posts_service
        .get_post(&query.post_id, query.platform.as_deref())
        .await?;

    Ok(Json(Response::success("Post fetched successfully.", view)))
}
