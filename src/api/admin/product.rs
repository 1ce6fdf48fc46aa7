use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Extension, Multipart, Path},
    http::StatusCode,
    response::Response,
    routing::{post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::api::response::catalog_error;
use crate::catalog::{self, ImageEntry, ProductDraft, Upload};
use crate::config::Config;
use crate::middleware::auth::Claims;
use crate::middleware::logging::{to_response, ApiError};
use crate::storage::DiskStore;

//ROUTERS
pub fn admin_product_router(
    db: Arc<DatabaseConnection>,
    storage: Arc<DiskStore>,
    config: Arc<Config>,
) -> Router {
    let body_limit = config.body_limit();

    Router::new()
        .route("/product", post(create_product))
        .route("/product/:id", put(update_product).delete(delete_product))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(db))
        .layer(Extension(storage))
        .layer(Extension(config))
}

//ROUTES
async fn create_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(storage): Extension<Arc<DiskStore>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Response {
    let (draft, images) = match read_product_form(multipart, config.file_size_limit).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let input = match draft.parse() {
        Ok(input) => input,
        Err(errors) => return catalog_error(errors.into()),
    };

    match catalog::create_product(&db, &*storage, &claims.caller(), input, images).await {
        Ok(product) => to_response((StatusCode::CREATED, Json(product)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn update_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(storage): Extension<Arc<DiskStore>>,
    Extension(config): Extension<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Response {
    let (draft, images) = match read_product_form(multipart, config.file_size_limit).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let input = match draft.parse() {
        Ok(input) => input,
        Err(errors) => return catalog_error(errors.into()),
    };

    match catalog::update_product(&db, &*storage, &claims.caller(), id, input, images).await {
        Ok(product) => to_response((StatusCode::OK, Json(product)), Ok(())),
        Err(err) => catalog_error(err),
    }
}

async fn delete_product(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(storage): Extension<Arc<DiskStore>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match catalog::delete_product(&db, &*storage, &claims.caller(), id).await {
        Ok(product) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Product deleted successfully.",
                    "id": product.id
                })),
            ),
            Ok(()),
        ),
        Err(err) => catalog_error(err),
    }
}

/// Reads the product form. Text parts fill the draft; `keep` and `image`
/// parts build the image list in the order they arrive.
async fn read_product_form(
    mut multipart: Multipart,
    size_limit: usize,
) -> Result<(ProductDraft, Vec<ImageEntry>), Response> {
    let mut draft = ProductDraft::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(bad_form)?;
                // An empty file input still submits an empty part.
                if data.is_empty() {
                    continue;
                }
                let upload = Upload::accept(content_type.as_deref(), data, size_limit)
                    .map_err(catalog_error)?;
                images.push(ImageEntry::New(upload));
            }
            "keep" => {
                let key = field.text().await.map_err(bad_form)?;
                images.push(ImageEntry::Kept {
                    key: key.trim().to_owned(),
                });
            }
            "name" => draft.name = Some(field.text().await.map_err(bad_form)?),
            "description" => draft.description = Some(field.text().await.map_err(bad_form)?),
            "price" => draft.price = Some(field.text().await.map_err(bad_form)?),
            "category_id" => draft.category_id = Some(field.text().await.map_err(bad_form)?),
            "affiliate_link" => {
                draft.affiliate_link = Some(field.text().await.map_err(bad_form)?)
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok((draft, images))
}

fn bad_form(err: MultipartError) -> Response {
    to_response(
        (
            err.status(),
            Json(json!({
                "error": err.body_text()
            })),
        ),
        Err(ApiError::General(format!("Multipart error: {err}"))),
    )
}
