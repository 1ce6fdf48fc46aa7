use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use std::str::FromStr;
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

use super::images::{self, ImageEntry, ImagePlan};
use super::query::ProductView;
use super::{check_name, field_error, Caller, CatalogError};
use crate::entities::product::ImageKeys;
use crate::entities::{category, product, wishlist};
use crate::storage::BlobStore;

/// Product form fields exactly as submitted.
#[derive(Debug, Default, Clone)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub affiliate_link: Option<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct ProductInput {
    #[validate(custom(function = "check_name"))]
    pub name: String,
    #[validate(length(max = 10000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(custom(function = "check_price"))]
    pub price: Decimal,
    pub category_id: i32,
    #[validate(url(message = "Affiliate link must be a valid URL"))]
    pub affiliate_link: String,
}

/// Integer digits a price column holds: DECIMAL(12, 2).
const PRICE_INTEGER_DIGITS: u32 = 10;
const PRICE_SCALE: u32 = 2;

fn check_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("range").with_message("Price cannot be negative".into()));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::new("scale")
            .with_message("Price can have at most 2 decimal places".into()));
    }
    if price.trunc() >= Decimal::from(10u64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(ValidationError::new("range").with_message("Price is too large".into()));
    }
    Ok(())
}

impl ProductDraft {
    /// Parses and validates the draft, collecting every field error at once.
    pub fn parse(self) -> Result<ProductInput, ValidationErrors> {
        let price = parse_field::<Decimal>(self.price, "Price");
        let category_id = parse_field::<i32>(self.category_id, "Category");

        let input = ProductInput {
            name: self.name.map(|name| name.trim().to_owned()).unwrap_or_default(),
            description: self
                .description
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
            price: price.as_ref().ok().copied().unwrap_or_default(),
            category_id: category_id.as_ref().ok().copied().unwrap_or_default(),
            affiliate_link: self
                .affiliate_link
                .map(|link| link.trim().to_owned())
                .unwrap_or_default(),
        };

        let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);
        if let Err(error) = price {
            errors.add("price", error);
        }
        if let Err(error) = category_id {
            errors.add("category_id", error);
        }

        if errors.errors().is_empty() {
            Ok(input)
        } else {
            Err(errors)
        }
    }
}

fn parse_field<T: FromStr>(raw: Option<String>, label: &str) -> Result<T, ValidationError> {
    match raw.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => value.parse::<T>().map_err(|_| {
            ValidationError::new("numeric").with_message(format!("{label} must be a number").into())
        }),
        _ => Err(ValidationError::new("required").with_message(format!("{label} is required").into())),
    }
}

/// Creates a product, storing `images` in order as its image list.
///
/// Nothing is created when any image fails to store.
pub async fn create_product<S: BlobStore>(
    db: &DatabaseConnection,
    storage: &S,
    caller: &Caller,
    input: ProductInput,
    images: Vec<ImageEntry>,
) -> Result<ProductView, CatalogError> {
    caller.require_admin()?;
    input.validate()?;
    let plan = ImagePlan::new(&[], images)?;

    let txn = db.begin().await?;
    let category = existing_category(&txn, input.category_id).await?;
    let stored = images::store_all(storage, plan.incoming).await?;

    let record = product::ActiveModel {
        search_text: Set(product::search_text(
            &input.name,
            input.description.as_deref(),
        )),
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        category_id: Set(input.category_id),
        affiliate_link: Set(input.affiliate_link),
        image_keys: Set(ImageKeys(stored.clone())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let saved = match insert_and_commit(txn, record).await {
        Ok(model) => model,
        Err(err) => {
            images::discard(storage, &stored).await;
            return Err(err.into());
        }
    };

    info!(
        product_id = saved.id,
        caller = caller.user_id,
        images = stored.len(),
        "Created product"
    );
    Ok(ProductView::new(saved, Some(category)))
}

/// Replaces a product's fields and reconciles its image list with `images`.
///
/// New uploads are stored before the record is written and deleted again if
/// the write fails. Images dropped from the list are deleted only after the
/// write commits, and a failed deletion never fails the update.
pub async fn update_product<S: BlobStore>(
    db: &DatabaseConnection,
    storage: &S,
    caller: &Caller,
    id: i32,
    input: ProductInput,
    images: Vec<ImageEntry>,
) -> Result<ProductView, CatalogError> {
    caller.require_admin()?;
    input.validate()?;

    let txn = db.begin().await?;
    let current = product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "product",
            id,
        })?;
    let category = existing_category(&txn, input.category_id).await?;

    let ImagePlan {
        mut kept,
        incoming,
        removed,
    } = ImagePlan::new(&current.image_keys.0, images)?;
    let added = images::store_all(storage, incoming).await?;
    kept.extend(added.iter().cloned());

    let mut record: product::ActiveModel = current.into();
    record.search_text = Set(product::search_text(
        &input.name,
        input.description.as_deref(),
    ));
    record.name = Set(input.name);
    record.description = Set(input.description);
    record.price = Set(input.price);
    record.category_id = Set(input.category_id);
    record.affiliate_link = Set(input.affiliate_link);
    record.image_keys = Set(ImageKeys(kept));

    let saved = match update_and_commit(txn, record).await {
        Ok(model) => model,
        Err(err) => {
            images::discard(storage, &added).await;
            return Err(err.into());
        }
    };

    let failed = images::discard(storage, &removed).await;
    info!(
        product_id = id,
        caller = caller.user_id,
        added = added.len(),
        removed = removed.len(),
        failed_deletions = failed,
        "Updated product"
    );
    Ok(ProductView::new(saved, Some(category)))
}

/// Deletes a product, its wishlist entries and then, best-effort, its images.
pub async fn delete_product<S: BlobStore>(
    db: &DatabaseConnection,
    storage: &S,
    caller: &Caller,
    id: i32,
) -> Result<product::Model, CatalogError> {
    caller.require_admin()?;

    let txn = db.begin().await?;
    let product = product::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "product",
            id,
        })?;

    let unlinked = wishlist::Entity::delete_many()
        .filter(wishlist::Column::ProductId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    product::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let failed = images::discard(storage, &images::unique_keys(&product.image_keys.0)).await;
    info!(
        product_id = id,
        caller = caller.user_id,
        wishlist_entries = unlinked,
        failed_deletions = failed,
        "Deleted product"
    );
    Ok(product)
}

/// The referenced category, or a field error on `category_id`.
async fn existing_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category::Model, CatalogError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| {
            field_error("category_id", "exists", "Selected category does not exist").into()
        })
}

async fn insert_and_commit(
    txn: DatabaseTransaction,
    record: product::ActiveModel,
) -> Result<product::Model, DbErr> {
    let model = record.insert(&txn).await?;
    txn.commit().await?;
    Ok(model)
}

async fn update_and_commit(
    txn: DatabaseTransaction,
    record: product::ActiveModel,
) -> Result<product::Model, DbErr> {
    let model = record.update(&txn).await?;
    txn.commit().await?;
    Ok(model)
}
