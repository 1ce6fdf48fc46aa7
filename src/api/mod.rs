pub mod admin;
pub mod public;
pub mod response;
pub mod user;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::logging::logging_middleware;
use crate::storage::DiskStore;
use admin::admin_api_router;
use public::{public_api_router, public_root_router};
use user::user_api_router;

pub fn create_api_router(
    shared_db: Arc<DatabaseConnection>,
    storage: Arc<DiskStore>,
    config: Arc<Config>,
) -> Router {
    let api = Router::new()
        .merge(public_api_router(shared_db.clone()))
        .merge(user_api_router(shared_db.clone(), config.clone()))
        .nest(
            "/admin",
            admin_api_router(shared_db.clone(), storage.clone(), config.clone()),
        );

    Router::new()
        .merge(public_root_router(shared_db, storage, config))
        .nest("/api", api)
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}
