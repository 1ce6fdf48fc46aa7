pub mod wishlist;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use wishlist::wishlist_router;

pub fn user_api_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    Router::new()
        .merge(wishlist_router(db.clone()))
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                secret: Arc::from(config.secret.as_str()),
                role: Role::User,
            },
            auth_middleware,
        ))
}
