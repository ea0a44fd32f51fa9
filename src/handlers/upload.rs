use std::sync::Arc;

use axum::{extract::Multipart, response::IntoResponse, routing::post, Extension, Json, Router};
use axum_extra::extract::WithRejection;
use tracing::info;

use crate::{
    ingest::{parse_upload, FileKind},
    models::event_row::UploadSummary,
    AppState, Error, Result,
};

pub fn upload_handler() -> Router {
    Router::new().route("/upload", post(upload))
}

async fn upload(
    Extension(app_state): Extension<Arc<AppState>>,
    WithRejection(mut multipart, _): WithRejection<Multipart, Error>,
) -> Result<impl IntoResponse> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }
    let (filename, bytes) =
        upload.ok_or_else(|| Error::BadRequest("Missing 'file' field".to_string()))?;

    let (kind, file_type) = FileKind::from_filename(&filename)?;
    let rows = parse_upload(kind, &bytes)?;
    info!(filename = %filename, rows = rows.len(), "Parsed upload");

    let events_created = app_state.events_service.schedule(&rows).await?;

    Ok(Json(UploadSummary {
        status: "success",
        file_type,
        rows_received: rows.len(),
        events_created,
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::app;

    const BOUNDARY: &str = "writer-agent-boundary";

    async fn upload(router: &Router, filename: &str, content: &str) -> (StatusCode, Value) {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn csv_upload_creates_events() {
        let router = app();
        let csv = "slno,topic,imageGenerated,selectDate,time\n\
                   1,AI trends,true,01/15/2025,10:00\n\
                   2,Rust tips,false,01/16/2025,2:30 PM\n";

        let (status, body) = upload(&router, "plan.csv", csv).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "success",
                "fileType": "csv",
                "rowsReceived": 2,
                "eventsCreated": ["event-1", "event-2"]
            })
        );
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected() {
        let router = app();
        let (status, body) = upload(&router, "notes.txt", "hello").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Unsupported file type: .txt (only PDF, XLSX, XLS, CSV allowed)"
        );
    }

    #[tokio::test]
    async fn bad_time_is_rejected() {
        let router = app();
        let csv = "slno,topic,imageGenerated,selectDate,time\n1,AI,true,01/15/2025,noon\n";

        let (status, body) = upload(&router, "plan.csv", csv).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Unsupported date/time format: '01/15/2025 noon'");
    }
}
