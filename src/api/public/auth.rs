use axum::{extract::Extension, http::StatusCode, response::Response, routing::post, Json, Router};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::generate_token;
use crate::middleware::logging::{to_response, ApiError};

pub fn auth_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/login", post(login))
        .layer(Extension(db))
        .layer(Extension(config))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    Json(payload): Json<UserLogin>,
) -> Response {
    debug!(username = %payload.username, "Login attempt");

    let account = match UserEntity::find()
        .filter(user::Column::Username.eq(payload.username.as_str()))
        .one(&*db)
        .await
    {
        Ok(account) => account,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let Some(account) = account.filter(|account| account.check_hash(&payload.password).is_ok())
    else {
        let tmp = "Invalid username or password";
        return to_response(
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": tmp }))),
            Err(ApiError::Unauthorized(tmp.to_string())),
        );
    };

    match generate_token(account.id, account.role, &config.secret) {
        Ok(token) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "token": token,
                    "role": account.role,
                })),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::TokenGenerationFailed(err.to_string())),
        ),
    }
}

#[derive(Deserialize)]
struct UserLogin {
    username: String,
    password: String,
}
