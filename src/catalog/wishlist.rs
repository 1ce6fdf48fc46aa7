use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

use super::query::{with_categories, ProductView};
use super::{Caller, CatalogError};
use crate::entities::{product, wishlist};

#[derive(Debug, Clone, Serialize)]
pub struct WishlistSummary {
    pub count: u64,
    pub recent: Vec<ProductView>,
}

/// Saves a product for the caller. Returns `false` when it was already saved.
pub async fn add_to_wishlist(
    db: &DatabaseConnection,
    caller: &Caller,
    product_id: i32,
) -> Result<bool, CatalogError> {
    let txn = db.begin().await?;
    if product::Entity::find_by_id(product_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(CatalogError::NotFound {
            entity: "product",
            id: product_id,
        });
    }

    let entry = wishlist::ActiveModel {
        user_id: Set(caller.user_id),
        product_id: Set(product_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let inserted = wishlist::Entity::insert(entry)
        .on_conflict(
            OnConflict::columns([wishlist::Column::UserId, wishlist::Column::ProductId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
    txn.commit().await?;

    debug!(user_id = caller.user_id, product_id, inserted, "Wishlist add");
    Ok(inserted > 0)
}

/// Drops a product from the caller's wishlist. Returns `false` when it was not there.
pub async fn remove_from_wishlist(
    db: &DatabaseConnection,
    caller: &Caller,
    product_id: i32,
) -> Result<bool, CatalogError> {
    let removed = wishlist::Entity::delete_many()
        .filter(wishlist::Column::UserId.eq(caller.user_id))
        .filter(wishlist::Column::ProductId.eq(product_id))
        .exec(db)
        .await?
        .rows_affected;

    debug!(user_id = caller.user_id, product_id, removed, "Wishlist remove");
    Ok(removed > 0)
}

/// The caller's saved products, most recently added first. `limit` bounds
/// the result for "recent" views.
pub async fn list_wishlist<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    limit: Option<u64>,
) -> Result<Vec<ProductView>, CatalogError> {
    let rows = wishlist::Entity::find()
        .filter(wishlist::Column::UserId.eq(caller.user_id))
        .order_by_desc(wishlist::Column::Id)
        .limit(limit)
        .find_also_related(product::Entity)
        .all(db)
        .await?;

    let products = rows.into_iter().filter_map(|(_, product)| product).collect();
    Ok(with_categories(db, products).await?)
}

/// Total saved count plus the `recent` latest products.
pub async fn wishlist_summary<C: ConnectionTrait>(
    db: &C,
    caller: &Caller,
    recent: u64,
) -> Result<WishlistSummary, CatalogError> {
    let count = wishlist::Entity::find()
        .filter(wishlist::Column::UserId.eq(caller.user_id))
        .count(db)
        .await?;

    Ok(WishlistSummary {
        count,
        recent: list_wishlist(db, caller, Some(recent)).await?,
    })
}
