use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::Caller;
use crate::entities::user::{Entity as UserEntity, Role};
use crate::middleware::logging::{to_response, ApiError};

const TOKEN_LIFETIME_HOURS: i64 = 24;

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_owned);

    let Some(token) = token else {
        return reject(AuthMiddlewareError::MissingToken);
    };

    match validate_token(&state.db, &state.secret, &token, state.role).await {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(err) => reject(err),
    }
}

fn reject(err: AuthMiddlewareError) -> Response {
    let status = match err {
        AuthMiddlewareError::InsufficientRole => StatusCode::FORBIDDEN,
        AuthMiddlewareError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    };
    to_response(
        (status, Json(json!({ "error": err.to_string() }))),
        Err(ApiError::Unauthorized(err.to_string())),
    )
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// What a router group requires from its callers.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub secret: Arc<str>,
    pub role: Role,
}

pub fn generate_token(user_id: i32, role: Role, secret: &str) -> Result<String, AuthMiddlewareError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_LIFETIME_HOURS))
        .ok_or(AuthMiddlewareError::GenerationFail)?
        .timestamp() as usize;

    let claims = Claims { user_id, role, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)
}

/// Decodes `token` and checks that its user still exists with the same role
/// and that the role satisfies `required`.
pub async fn validate_token(
    db: &DatabaseConnection,
    secret: &str,
    token: &str,
    required: Role,
) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AuthMiddlewareError::ValidationFail)?
    .claims;

    match UserEntity::find_by_id(claims.user_id).one(db).await? {
        Some(user) if user.role == claims.role => {}
        _ => return Err(AuthMiddlewareError::InvalidUserOrRole),
    }

    if !claims.role.permits(required) {
        return Err(AuthMiddlewareError::InsufficientRole);
    }

    Ok(claims)
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}
