pub mod category;
pub mod product;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use category::admin_category_router;
use product::admin_product_router;

use crate::config::Config;
use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use crate::storage::DiskStore;

pub fn admin_api_router(
    db: Arc<DatabaseConnection>,
    storage: Arc<DiskStore>,
    config: Arc<Config>,
) -> Router {
    let secret: Arc<str> = Arc::from(config.secret.as_str());

    Router::new()
        .merge(admin_category_router(db.clone()))
        .merge(admin_product_router(db.clone(), storage, config))
        .route_layer(from_fn_with_state(
            AuthState {
                db,
                secret,
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
