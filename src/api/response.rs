use axum::{http::StatusCode, response::Response, Json};
use serde_json::json;
use std::collections::BTreeMap;
use validator::ValidationErrors;

use crate::catalog::CatalogError;
use crate::middleware::logging::{to_response, ApiError};

/// Maps a catalog failure to its HTTP outcome.
pub fn catalog_error(err: CatalogError) -> Response {
    match err {
        CatalogError::Validation(errors) => to_response(
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "Validation failed",
                    "fields": field_messages(&errors),
                })),
            ),
            Err(ApiError::ValidationFail(errors.to_string())),
        ),
        CatalogError::NotFound { .. } => {
            let tmp = err.to_string();
            to_response(
                (StatusCode::NOT_FOUND, Json(json!({ "error": tmp }))),
                Err(ApiError::General(tmp)),
            )
        }
        CatalogError::Conflict(message) => to_response(
            (StatusCode::CONFLICT, Json(json!({ "error": message }))),
            Err(ApiError::General(message)),
        ),
        CatalogError::TooLarge { .. } => {
            let tmp = err.to_string();
            to_response(
                (StatusCode::PAYLOAD_TOO_LARGE, Json(json!({ "error": tmp }))),
                Err(ApiError::General(tmp)),
            )
        }
        CatalogError::Forbidden => {
            let tmp = err.to_string();
            to_response(
                (StatusCode::FORBIDDEN, Json(json!({ "error": tmp }))),
                Err(ApiError::Unauthorized(tmp)),
            )
        }
        CatalogError::Storage(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to store image" })),
            ),
            Err(ApiError::Storage(err.to_string())),
        ),
        CatalogError::Db(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, list)| {
            let messages = list
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
