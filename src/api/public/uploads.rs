use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::middleware::logging::{to_response, ApiError};
use crate::storage::{DiskStore, StorageError};

pub fn uploads_router(storage: Arc<DiskStore>) -> Router {
    Router::new()
        .route("/image/:key", get(print_image))
        .layer(Extension(storage))
}

pub async fn print_image(
    Path(key): Path<String>,
    Extension(storage): Extension<Arc<DiskStore>>,
) -> Response {
    let file = match storage.read(&key).await {
        Ok(file) => file,
        Err(err @ (StorageError::InvalidKey(_) | StorageError::Missing(_))) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "Not found"
                    })),
                ),
                Err(ApiError::General(err.to_string())),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::Storage(err.to_string())),
            );
        }
    };

    let content_type = mime_guess::from_path(&key)
        .first_raw()
        .unwrap_or("application/octet-stream");

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("inline"),
    );

    to_response((headers, body), Ok(()))
}
