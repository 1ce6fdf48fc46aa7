#![allow(dead_code)]

use bytes::Bytes;
use reqwest::{multipart, Client, StatusCode};
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use storefront::api::create_api_router;
use storefront::catalog::Caller;
use storefront::config::Config;
use storefront::entities::{primary_setup, setup_schema, user};
use storefront::storage::{new_key, BlobStore, DiskStore, FileExtension, StorageError};

pub const PASSWORD: &str = "Secret15";
pub const FILE_SIZE_LIMIT: usize = 64 * 1024;

/// A fresh SQLite file database with the schema and seeded accounts.
pub async fn test_db(dir: &TempDir) -> DatabaseConnection {
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("storefront.db").display()
    );
    let db = Database::connect(&url)
        .await
        .expect("Failed to open test database");
    setup_schema(&db).await.expect("Failed to create schema");
    primary_setup(&db, PASSWORD)
        .await
        .expect("Failed to seed accounts");
    db
}

pub async fn caller(db: &DatabaseConnection, username: &str) -> Caller {
    let account = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .expect("Failed to query users")
        .expect("Seeded account is missing");
    Caller {
        user_id: account.id,
        role: account.role,
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

/// Serves the full router on an ephemeral local port.
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Arc::new(test_db(&dir).await);
    let upload_dir = dir.path().join("uploads");
    let storage = Arc::new(
        DiskStore::open(&upload_dir)
            .await
            .expect("Failed to open upload dir"),
    );
    let config = Arc::new(Config {
        database_url: String::new(),
        bind_address: "127.0.0.1:0".into(),
        secret: "test-secret".into(),
        upload_dir: upload_dir.clone(),
        file_size_limit: FILE_SIZE_LIMIT,
        seed_password: PASSWORD.into(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let app = create_api_router(db.clone(), storage, config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: Client::new(),
        db,
        upload_dir,
        _dir: dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, username: &str) -> String {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to send login request");
        assert_eq!(response.status(), StatusCode::OK);

        let body = response
            .json::<Value>()
            .await
            .expect("Failed to parse login response JSON");
        body["token"]
            .as_str()
            .expect("Token not found in login response")
            .to_owned()
    }

    pub async fn create_category(&self, token: &str, name: &str) -> i64 {
        let response = self
            .client
            .post(self.url("/api/admin/category"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Failed to send create category request");
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.json::<Value>().await.unwrap();
        body["id"].as_i64().expect("Category id missing")
    }

    pub async fn create_product(&self, token: &str, form: multipart::Form) -> Value {
        let response = self
            .client
            .post(self.url("/api/admin/product"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json::<Value>().await.unwrap()
    }

    /// Names of the files currently in the upload directory, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.upload_dir)
            .expect("Failed to read upload dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn product_form(name: &str, price: &str, category_id: i64) -> multipart::Form {
    multipart::Form::new()
        .text("name", name.to_owned())
        .text("description", format!("{name} description"))
        .text("price", price.to_owned())
        .text("category_id", category_id.to_string())
        .text("affiliate_link", "https://shop.example.com/item")
}

pub fn png_part(data: &[u8]) -> multipart::Part {
    multipart::Part::bytes(data.to_vec())
        .file_name("photo.png")
        .mime_str("image/png")
        .unwrap()
}

pub fn keys_of(product: &Value) -> Vec<String> {
    product["image_keys"]
        .as_array()
        .expect("image_keys missing")
        .iter()
        .map(|key| key.as_str().unwrap().to_owned())
        .collect()
}

/// In-memory blob store with switchable failures.
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Bytes>>,
    puts_left: Mutex<Option<usize>>,
    failing_deletes: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets `count` more puts succeed, then fails every following one.
    pub fn fail_puts_after(&self, count: usize) {
        *self.puts_left.lock().unwrap() = Some(count);
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_owned());
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.blobs.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

impl BlobStore for MemoryStore {
    async fn put(&self, data: Bytes, extension: FileExtension) -> Result<String, StorageError> {
        {
            let mut puts_left = self.puts_left.lock().unwrap();
            if let Some(left) = puts_left.as_mut() {
                if *left == 0 {
                    return Err(StorageError::Io(io::Error::new(
                        io::ErrorKind::Other,
                        "disk full",
                    )));
                }
                *left -= 1;
            }
        }

        let key = new_key(extension);
        self.blobs.lock().unwrap().insert(key.clone(), data);
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only",
            )));
        }
        match self.blobs.lock().unwrap().remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::Missing(key.to_owned())),
        }
    }
}
