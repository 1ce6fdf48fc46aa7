use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::api::response::catalog_error;
use crate::catalog::{self, ProductFilter};
use crate::middleware::logging::to_response;

pub fn product_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/product", get(get_products))
        .route("/product/:id", get(get_product))
        .layer(Extension(db))
}

async fn get_products(
    Query(filter): Query<ProductFilter>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::list_products(&*db, &filter).await {
        Ok(products) => to_response((StatusCode::OK, Json(products)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn get_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::get_product(&*db, id).await {
        Ok(product) => to_response((StatusCode::OK, Json(product)), Ok(())),
        Err(err) => catalog_error(err),
    }
}
