use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use tower_cookies::Cookie;
use validator::Validate;

use crate::{
    models::{
        response::Response,
        users::{AuthRequestDto, TokenData},
    },
    AppState, Error, Result,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
}

pub async fn signup(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<AuthRequestDto>, Error>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    app_state
        .auth_service
        .register(&body.email, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Response::message("User created successfully")),
    ))
}

pub async fn signin(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<AuthRequestDto>, Error>,
) -> Result<impl IntoResponse> {
    body.validate()?;

    let session = app_state
        .auth_service
        .login(&body.email, &body.password)
        .await?;

    let cookie = Cookie::build(("token", session.id_token.clone()))
        .path("/")
        .max_age(time::Duration::seconds(session.expires_in))
        .http_only(true)
        .build();
    let cookie =
        HeaderValue::from_str(&cookie.to_string()).map_err(|_| Error::InternalServerError)?;

    let mut response = Json(Response::success(
        "Login successful",
        TokenData {
            access_token: session.id_token,
        },
    ))
    .into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support::{app, send};

    #[tokio::test]
    async fn signin_sets_an_http_only_cookie() {
        let router = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/signin")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "jane@example.com", "password": "Secret#123" }).to_string(),
            ))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("token=id-token-jane@example.com"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[tokio::test]
    async fn signin_returns_the_access_token() {
        let router = app();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/signin",
            Some(json!({ "email": "jane@example.com", "password": "Secret#123" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["access_token"], "id-token-jane@example.com");
    }

    #[tokio::test]
    async fn signup_validates_before_calling_the_provider() {
        let router = app();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/signup",
            Some(json!({ "email": "not-an-email", "password": "weak" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn signup_creates_the_account() {
        let router = app();
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/signup",
            Some(json!({ "email": "jane@example.com", "password": "Secret#123" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");
    }
}
