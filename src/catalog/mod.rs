//! Catalog & product management.
//!
//! Every operation takes the database handle, the blob store where images are
//! involved, and the explicit [`Caller`] on whose behalf it runs. HTTP glue
//! lives in `crate::api`.

pub mod category;
pub mod images;
pub mod product;
pub mod query;
pub mod wishlist;

pub use category::{
    create_category, delete_category, get_category, list_categories,
    list_categories_with_products, rename_category, CategoryInput, CategoryWithProducts,
};
pub use images::{ImageEntry, ImagePlan, Upload};
pub use product::{create_product, delete_product, update_product, ProductDraft, ProductInput};
pub use query::{get_product, list_products, ProductFilter, ProductView};
pub use wishlist::{
    add_to_wishlist, list_wishlist, remove_from_wishlist, wishlist_summary, WishlistSummary,
};

use sea_orm::DbErr;
use std::borrow::Cow;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

use crate::entities::user::Role;
use crate::storage::StorageError;

/// Identity of whoever triggered an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub role: Role,
}

impl Caller {
    pub fn require_admin(&self) -> Result<(), CatalogError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(CatalogError::Forbidden)
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("No {entity} with {id} id was found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("{0}")]
    Conflict(String),
    #[error("Image exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("Administrator role required")]
    Forbidden,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Longest product or category name accepted, in characters.
pub const NAME_MAX_CHARS: usize = 255;

/// Shared rule for product and category names.
pub(crate) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("Name is required".into()));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::new("length").with_message("Name is too long".into()));
    }
    Ok(())
}

pub(crate) fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(message.into()));
    errors
}
