pub mod category;
pub mod product;
pub mod user;
pub mod wishlist;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::{
    sea_query::Index, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set, TransactionTrait,
};
use tracing::info;

use crate::entities::{
    category::Entity as Category, product::Entity as Product, user::Entity as User,
    wishlist::Entity as Wishlist,
};

/// Creates every table (parents first) and the wishlist indexes. Safe to run
/// against an existing database.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Wishlist),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(backend.build(&table)).await?;
    }

    for mut index in schema.create_index_from_entity(Wishlist) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    let pair_index = Index::create()
        .name("idx-wishlist-user-product")
        .table(Wishlist)
        .col(wishlist::Column::UserId)
        .col(wishlist::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&pair_index)).await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to hash seed password: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("Database error: {0}")]
    Db(#[from] DbErr),
}

/// Seeds the `admin` and `user` accounts when they are missing.
pub async fn primary_setup(db: &DatabaseConnection, password: &str) -> Result<(), SeedError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(SeedError::PasswordHash)?
        .to_string();

    let txn = db.begin().await?;
    for (username, role) in [("admin", user::Role::Admin), ("user", user::Role::User)] {
        let existing = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&txn)
            .await?;
        if existing.is_some() {
            continue;
        }

        let account = user::ActiveModel {
            username: Set(username.to_owned()),
            password: Set(password_hash.clone()),
            role: Set(role),
            ..Default::default()
        };
        User::insert(account).exec(&txn).await?;
        info!(username, role = %role, "Seeded account");
    }
    txn.commit().await?;

    Ok(())
}
