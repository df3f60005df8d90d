use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{AnalysisError, AnalysisHandler};
use crate::models::DetectionSummary;

/// Uploads larger than this are rejected before decoding.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub handler: Arc<AnalysisHandler>,
}

pub fn create_router(handler: Arc<AnalysisHandler>) -> Router {
    let state = Arc::new(AppState { handler });

    // Wildcard CORS, matching the web clients this service fronts.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/detect", post(detect_handler))
        .route("/detect/", post(detect_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

type ErrorResponse = (StatusCode, Json<serde_json::Value>);

fn error_payload(status: StatusCode, message: &str) -> ErrorResponse {
    (status, Json(serde_json::json!({ "error": message })))
}

/// POST /detect - multipart form with an `image` file field.
async fn detect_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DetectionSummary>, ErrorResponse> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        log::error!("❌ Failed to read multipart body: {}", e);
        error_payload(StatusCode::BAD_REQUEST, &format!("invalid upload: {}", e))
    })? {
        if field.name() == Some("image") {
            let filename = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                log::error!("❌ Failed to read image field: {}", e);
                error_payload(StatusCode::BAD_REQUEST, &format!("invalid upload: {}", e))
            })?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(error_payload(
            StatusCode::BAD_REQUEST,
            "missing 'image' upload field",
        ));
    };

    match state.handler.analyze(filename.as_deref(), &bytes).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e @ AnalysisError::InvalidImage(_)) => {
            log::error!("❌ Rejected upload: {}", e);
            Err(error_payload(StatusCode::BAD_REQUEST, &e.to_string()))
        }
        Err(e @ AnalysisError::DetectorFailure(_)) => {
            log::error!("❌ Detection failed: {}", e);
            Err(error_payload(StatusCode::BAD_GATEWAY, &e.to_string()))
        }
    }
}

async fn root_handler() -> &'static str {
    "Food Calorie API - POST a meal photo to /detect"
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_shape() {
        let (status, Json(body)) =
            error_payload(StatusCode::BAD_GATEWAY, "detector failure: timed out");

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            serde_json::json!({"error": "detector failure: timed out"})
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
