use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;

use crate::api::response::catalog_error;
use crate::catalog::{self, CategoryInput};
use crate::middleware::auth::Claims;
use crate::middleware::logging::to_response;

//ROUTERS
pub fn admin_category_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/category", post(create_category))
        .route(
            "/category/:id",
            patch(patch_category).delete(delete_category),
        )
        .layer(Extension(db))
}

//ROUTES
async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CategoryInput>,
) -> Response {
    match catalog::create_category(&db, &claims.caller(), payload).await {
        Ok(category) => to_response((StatusCode::CREATED, Json(category)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn patch_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CategoryInput>,
) -> Response {
    match catalog::rename_category(&db, &claims.caller(), id, payload).await {
        Ok(category) => to_response((StatusCode::OK, Json(category)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn delete_category(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::delete_category(&db, &claims.caller(), id).await {
        Ok(category) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Category deleted successfully.",
                    "id": category.id
                })),
            ),
            Ok(()),
        ),
        Err(err) => catalog_error(err),
    }
}
