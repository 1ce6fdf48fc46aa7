use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub category_id: i32,
    pub affiliate_link: String,
    pub image_keys: ImageKeys,
    /// Lowercased name and description, matched by text search.
    #[serde(skip)]
    #[sea_orm(column_type = "Text")]
    pub search_text: String,
    pub created_at: DateTimeUtc,
}

/// Folds name and description for [`Model::search_text`]. Folding happens here
/// rather than in SQL because SQLite's `LOWER()` only handles ASCII.
pub fn search_text(name: &str, description: Option<&str>) -> String {
    match description {
        Some(description) => format!("{}\n{}", name.to_lowercase(), description.to_lowercase()),
        None => name.to_lowercase(),
    }
}

/// Storage keys of a product's images. Order matters: the first key is the
/// primary display image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageKeys(pub Vec<String>);

impl ImageKeys {
    pub fn primary(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict",
    )]
    Category,
    #[sea_orm(has_many = "super::wishlist::Entity")]
    Wishlist,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
