use std::{path::Path, sync::Arc};

use axum::{routing::get, Extension, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{agent::agent_handler, auth::auth_handler, upload::upload_handler},
    models::response::Response,
    AppState,
};

pub const IMAGES_ROUTE: &str = "/public/generated_images";

pub fn create_routes(app_state: Arc<AppState>, image_dir: &Path) -> Router {
    let api_route = Router::new()
        .merge(agent_handler())
        .merge(auth_handler())
        .merge(upload_handler())
        .layer(Extension(app_state));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_route)
        .nest_service(IMAGES_ROUTE, ServeDir::new(image_dir))
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors())
}

pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Response> {
    Json(Response::message("Writer Agent backend is running."))
}

async fn health() -> Json<Response> {
    Json(Response::message("ok"))
}
