use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::response::catalog_error;
use crate::catalog;
use crate::middleware::auth::Claims;
use crate::middleware::logging::to_response;

/// Size of the "recently saved" list on the dashboard.
const RECENT_WISHLIST_ITEMS: u64 = 6;

//ROUTERS
pub fn wishlist_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/wishlist", get(get_wishlist))
        .route("/wishlist/summary", get(get_summary))
        .route(
            "/wishlist/:product_id",
            post(add_product).delete(remove_product),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_wishlist(
    Query(params): Query<WishlistQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::list_wishlist(&*db, &claims.caller(), params.limit).await {
        Ok(products) => to_response((StatusCode::OK, Json(products)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn get_summary(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::wishlist_summary(&*db, &claims.caller(), RECENT_WISHLIST_ITEMS).await {
        Ok(summary) => to_response((StatusCode::OK, Json(summary)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn add_product(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::add_to_wishlist(&db, &claims.caller(), product_id).await {
        Ok(true) => to_response(
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Added to wishlist."
                })),
            ),
            Ok(()),
        ),
        Ok(false) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Already in wishlist."
                })),
            ),
            Ok(()),
        ),
        Err(err) => catalog_error(err),
    }
}

async fn remove_product(
    Path(product_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::remove_from_wishlist(&db, &claims.caller(), product_id).await {
        Ok(removed) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Removed from wishlist.",
                    "removed": removed
                })),
            ),
            Ok(()),
        ),
        Err(err) => catalog_error(err),
    }
}

//Structs
#[derive(Deserialize)]
struct WishlistQuery {
    limit: Option<u64>,
}
