use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{LikeExpr, SimpleExpr},
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QueryTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::CatalogError;
use crate::entities::{category, product};

/// Filters accepted by [`list_products`]. Both are optional and combine with AND.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<i32>,
    pub search: Option<String>,
}

impl ProductFilter {
    /// `LIKE` pattern for the search text, lowercased the same way as
    /// `product::search_text`, with wildcards escaped.
    /// Blank search text means no text filter.
    fn search_pattern(&self) -> Option<String> {
        let text = self.search.as_deref()?.trim();
        if text.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(text.len() + 2);
        pattern.push('%');
        for ch in text.to_lowercase().chars() {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// Product as shown to clients, with its category embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: i32,
    pub affiliate_link: String,
    pub image_keys: Vec<String>,
    pub primary_image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<category::Model>,
}

impl ProductView {
    pub fn new(value: product::Model, category: Option<category::Model>) -> ProductView {
        ProductView {
            primary_image: value.image_keys.primary().map(str::to_owned),
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            category_id: value.category_id,
            affiliate_link: value.affiliate_link,
            image_keys: value.image_keys.0,
            created_at: value.created_at,
            category,
        }
    }
}

/// Products matching `filter`, oldest first.
pub async fn list_products<C: ConnectionTrait>(
    db: &C,
    filter: &ProductFilter,
) -> Result<Vec<ProductView>, CatalogError> {
    let rows = product::Entity::find()
        .apply_if(filter.category_id, |query, id| {
            query.filter(product::Column::CategoryId.eq(id))
        })
        .apply_if(filter.search_pattern(), |query, pattern| {
            query.filter(matches_text(pattern))
        })
        .order_by_asc(product::Column::Id)
        .find_also_related(category::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(product, category)| ProductView::new(product, category))
        .collect())
}

pub async fn get_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<ProductView, CatalogError> {
    product::Entity::find_by_id(id)
        .find_also_related(category::Entity)
        .one(db)
        .await?
        .map(|(product, category)| ProductView::new(product, category))
        .ok_or(CatalogError::NotFound {
            entity: "product",
            id,
        })
}

/// Case-insensitive substring match on name or description, against the
/// pre-folded `search_text` column.
fn matches_text(pattern: String) -> SimpleExpr {
    product::Column::SearchText.like(LikeExpr::new(pattern).escape('\\'))
}

/// Builds views for `products`, keeping their order, with one category lookup.
pub(crate) async fn with_categories<C: ConnectionTrait>(
    db: &C,
    products: Vec<product::Model>,
) -> Result<Vec<ProductView>, DbErr> {
    let mut ids: Vec<i32> = products.iter().map(|p| p.category_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let categories: HashMap<i32, category::Model> = category::Entity::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|category| (category.id, category))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let category = categories.get(&product.category_id).cloned();
            ProductView::new(product, category)
        })
        .collect())
}
