//! HTTP boundary: upload validation and JSON responses.
//!
//! `POST /api/identify` takes a multipart form with an `image` field and
//! answers with an [`IdentificationRecord`](crate::IdentificationRecord) or
//! `{"error": "..."}`. `GET /api/identify` describes the endpoint.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::error::IdentifyError;
use crate::identifier::SnakeIdentifier;

/// Largest accepted image payload (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Headroom for multipart framing on top of the image itself.
const BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

const IMAGE_FIELD: &str = "image";

/// Rejected uploads. These never reach the vision model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No image file provided")]
    Missing,

    #[error("Invalid file type. Please upload an image.")]
    InvalidType,

    #[error("File too large. Please upload an image smaller than 10MB.")]
    TooLarge,
}

enum ApiError {
    Upload(UploadError),
    Identify(IdentifyError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upload(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Identify(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err)
    }
}

impl From<IdentifyError> for ApiError {
    fn from(err: IdentifyError) -> Self {
        ApiError::Identify(err)
    }
}

struct Upload {
    media_type: String,
    bytes: Vec<u8>,
}

/// Build the application router.
pub fn router(identifier: SnakeIdentifier) -> Router {
    Router::new()
        .route("/api/identify", get(describe).post(identify))
        .route("/api/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(identifier)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, identifier: SnakeIdentifier) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Snake identification server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(identifier))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn describe() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Snake identification API endpoint. Use POST to upload an image."
    }))
}

#[instrument(skip_all)]
async fn identify(
    State(identifier): State<SnakeIdentifier>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await,
        Err(rejection) => {
            warn!(%rejection, "request is not a multipart upload");
            Err(UploadError::Missing)
        }
    }
    .inspect_err(|e| warn!(error = %e, "upload rejected"))?;

    let record = identifier
        .identify(&upload.bytes, &upload.media_type)
        .await?;
    Ok(Json(record).into_response())
}

/// Pull the `image` field out of the form, validating type and size.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, UploadError> {
    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(UploadError::Missing),
            Err(e) => return Err(multipart_failure(e)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let media_type = field.content_type().unwrap_or_default().to_string();
        if field.file_name().is_none() && media_type.is_empty() {
            return Err(UploadError::Missing);
        }
        if !media_type.starts_with("image/") {
            return Err(UploadError::InvalidType);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_failure)? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(UploadError::Missing);
        }

        return Ok(Upload { media_type, bytes });
    }
}

fn multipart_failure(err: axum::extract::multipart::MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::Missing
    }
}
