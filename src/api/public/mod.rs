pub mod auth;
pub mod category;
pub mod product;
pub mod uploads;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use auth::auth_router;
use category::category_router;
use product::product_router;
use uploads::uploads_router;

use crate::config::Config;
use crate::storage::DiskStore;

/// Routes mounted at the root: login and image files.
pub fn public_root_router(
    db: Arc<DatabaseConnection>,
    storage: Arc<DiskStore>,
    config: Arc<Config>,
) -> Router {
    Router::new()
        .merge(auth_router(db, config))
        .merge(uploads_router(storage))
}

/// Read-only catalog routes mounted under `/api`.
pub fn public_api_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .merge(category_router(db.clone()))
        .merge(product_router(db))
}
