use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::catalog_error;
use crate::catalog;
use crate::middleware::logging::to_response;

pub fn category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", get(get_categories))
        .route("/category/:id", get(get_category))
        .layer(Extension(db))
}

async fn get_categories(
    Query(params): Query<GetCategoriesQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    if params.with_products.unwrap_or(false) {
        return match catalog::list_categories_with_products(&*db).await {
            Ok(categories) => to_response((StatusCode::OK, Json(categories)), Ok(())),
            Err(err) => catalog_error(err),
        };
    }

    match catalog::list_categories(&*db).await {
        Ok(categories) => to_response((StatusCode::OK, Json(categories)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn get_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match catalog::get_category(&*db, id).await {
        Ok(category) => to_response((StatusCode::OK, Json(category)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

#[derive(Deserialize)]
struct GetCategoriesQuery {
    with_products: Option<bool>,
}
