use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::query::ProductView;
use super::{check_name, Caller, CatalogError};
use crate::entities::{category, product};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(custom(function = "check_name"))]
    pub name: String,
}

impl CategoryInput {
    fn normalized(self) -> Result<Self, CatalogError> {
        let input = CategoryInput {
            name: self.name.trim().to_owned(),
        };
        input.validate()?;
        Ok(input)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: category::Model,
    pub products: Vec<ProductView>,
}

pub async fn list_categories<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<category::Model>, CatalogError> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Id)
        .all(db)
        .await?)
}

/// Every category with its products (oldest first) embedded, for browsing.
pub async fn list_categories_with_products<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<CategoryWithProducts>, CatalogError> {
    let rows = category::Entity::find()
        .order_by_asc(category::Column::Id)
        .find_with_related(product::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(category, mut products)| {
            products.sort_by_key(|product| product.id);
            CategoryWithProducts {
                category,
                products: products
                    .into_iter()
                    .map(|product| ProductView::new(product, None))
                    .collect(),
            }
        })
        .collect())
}

pub async fn get_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<category::Model, CatalogError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "category",
            id,
        })
}

pub async fn create_category(
    db: &DatabaseConnection,
    caller: &Caller,
    input: CategoryInput,
) -> Result<category::Model, CatalogError> {
    caller.require_admin()?;
    let input = input.normalized()?;

    let txn = db.begin().await?;
    ensure_name_free(&txn, &input.name, None).await?;

    let record = category::ActiveModel {
        name: Set(input.name.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let saved = record
        .insert(&txn)
        .await
        .map_err(|err| name_conflict(err, &input.name))?;
    txn.commit().await?;

    info!(category_id = saved.id, caller = caller.user_id, "Created category");
    Ok(saved)
}

pub async fn rename_category(
    db: &DatabaseConnection,
    caller: &Caller,
    id: i32,
    input: CategoryInput,
) -> Result<category::Model, CatalogError> {
    caller.require_admin()?;
    let input = input.normalized()?;

    let txn = db.begin().await?;
    let current = get_category(&txn, id).await?;
    ensure_name_free(&txn, &input.name, Some(id)).await?;

    let mut record: category::ActiveModel = current.into();
    record.name = Set(input.name.clone());
    let saved = record
        .update(&txn)
        .await
        .map_err(|err| name_conflict(err, &input.name))?;
    txn.commit().await?;

    info!(category_id = id, caller = caller.user_id, "Renamed category");
    Ok(saved)
}

/// Deletes an empty category. Categories that still have products are kept
/// and reported as a conflict.
pub async fn delete_category(
    db: &DatabaseConnection,
    caller: &Caller,
    id: i32,
) -> Result<category::Model, CatalogError> {
    caller.require_admin()?;

    let txn = db.begin().await?;
    let current = get_category(&txn, id).await?;

    let in_use = product::Entity::find()
        .filter(product::Column::CategoryId.eq(id))
        .count(&txn)
        .await?;
    if in_use > 0 {
        return Err(CatalogError::Conflict(format!(
            "Category {} still has {in_use} product(s)",
            current.name
        )));
    }

    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    info!(category_id = id, caller = caller.user_id, "Deleted category");
    Ok(current)
}

async fn ensure_name_free<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<i32>,
) -> Result<(), CatalogError> {
    let taken = category::Entity::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await?;

    match taken {
        Some(other) if Some(other.id) != except => Err(CatalogError::Conflict(format!(
            "Category {name} already exists"
        ))),
        _ => Ok(()),
    }
}

fn name_conflict(err: DbErr, name: &str) -> CatalogError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            CatalogError::Conflict(format!("Category {name} already exists"))
        }
        _ => err.into(),
    }
}
