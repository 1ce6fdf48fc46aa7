mod common;

use common::{keys_of, png_part, product_form, spawn_app, FILE_SIZE_LIMIT};
use reqwest::{multipart, StatusCode};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

fn price_of(product: &Value) -> Decimal {
    let raw = match &product["price"] {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Decimal::from_str(&raw).expect("Price is not a decimal")
}

#[tokio::test]
async fn test_create_product_with_images() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;

    let form = product_form("Aloe gel", "10.50", category)
        .part("image", png_part(b"front"))
        .part("image", png_part(b"back"));
    let product = app.create_product(&token, form).await;

    assert_eq!(product["name"], "Aloe gel");
    assert_eq!(price_of(&product), Decimal::from_str("10.5").unwrap());
    assert_eq!(product["category"]["name"], "Skincare");
    let keys = keys_of(&product);
    assert_eq!(keys.len(), 2);
    assert_eq!(product["primary_image"], keys[0].as_str());

    let mut expected = keys.clone();
    expected.sort();
    assert_eq!(app.stored_files(), expected);

    let response = app
        .client
        .get(app.url(&format!("/image/{}", keys[1])))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(&response.bytes().await.unwrap()[..], b"back");
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = spawn_app().await;
    let token = app.login("admin").await;

    let form = multipart::Form::new()
        .text("name", "")
        .text("price", "cheap")
        .text("category_id", "999")
        .text("affiliate_link", "not a link");
    let response = app
        .client
        .post(app.url("/api/admin/product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>().await.unwrap();
    for field in ["name", "price", "affiliate_link"] {
        assert!(body["fields"][field].is_array(), "missing error for {field}");
    }

    let form = product_form("Aloe gel", "10", 999);
    let response = app
        .client
        .post(app.url("/api/admin/product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>().await.unwrap();
    assert!(body["fields"]["category_id"].is_array());
}

#[tokio::test]
async fn test_create_product_rejects_bad_images() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;

    let text_file = multipart::Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = product_form("Aloe gel", "10", category).part("image", text_file);
    let response = app
        .client
        .post(app.url("/api/admin/product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let oversized = vec![0u8; FILE_SIZE_LIMIT + 1];
    let form = product_form("Aloe gel", "10", category).part("image", png_part(&oversized));
    let response = app
        .client
        .post(app.url("/api/admin/product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_update_product_images() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;
    let form = product_form("Aloe gel", "10", category)
        .part("image", png_part(b"x"))
        .part("image", png_part(b"y"));
    let product = app.create_product(&token, form).await;
    let id = product["id"].as_i64().unwrap();
    let keys = keys_of(&product);

    let form = product_form("Aloe gel XL", "12", category)
        .part("image", png_part(b"z"))
        .text("keep", keys[0].clone());
    let response = app
        .client
        .put(app.url(&format!("/api/admin/product/{id}")))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let updated = response.json::<Value>().await.unwrap();
    assert_eq!(updated["name"], "Aloe gel XL");
    assert_eq!(price_of(&updated), Decimal::from(12));
    let new_keys = keys_of(&updated);
    // Kept keys come first, then new uploads.
    assert_eq!(new_keys.len(), 2);
    assert_eq!(new_keys[0], keys[0]);
    assert!(!keys.contains(&new_keys[1]));

    let mut expected = new_keys.clone();
    expected.sort();
    assert_eq!(app.stored_files(), expected);

    let response = app
        .client
        .get(app.url(&format!("/image/{}", keys[1])))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_product_with_foreign_image() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;
    let first = app
        .create_product(
            &token,
            product_form("Aloe gel", "10", category).part("image", png_part(b"x")),
        )
        .await;
    let second = app
        .create_product(&token, product_form("Rose toner", "20", category))
        .await;

    let form = product_form("Rose toner", "20", category).text("keep", keys_of(&first)[0].clone());
    let response = app
        .client
        .put(app.url(&format!("/api/admin/product/{}", second["id"])))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>().await.unwrap();
    assert!(body["fields"]["images"].is_array());
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;

    let response = app
        .client
        .put(app.url("/api/admin/product/404"))
        .bearer_auth(&token)
        .multipart(product_form("Ghost", "1", category))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;
    let product = app
        .create_product(
            &token,
            product_form("Aloe gel", "10", category).part("image", png_part(b"x")),
        )
        .await;
    let id = product["id"].as_i64().unwrap();

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/product/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.stored_files().is_empty());

    let response = app
        .client
        .get(app.url(&format!("/api/product/{id}")))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .client
        .delete(app.url(&format!("/api/admin/product/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_products_with_filters() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let skincare = app.create_category(&token, "Skincare").await;
    let haircare = app.create_category(&token, "Haircare").await;
    app.create_product(&token, product_form("Aloe gel", "10", skincare))
        .await;
    app.create_product(&token, product_form("Rose toner", "20", skincare))
        .await;
    app.create_product(&token, product_form("Argan oil", "15", haircare))
        .await;

    let names = |body: Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|product| product["name"].as_str().unwrap().to_owned())
            .collect()
    };

    let response = app
        .client
        .get(app.url("/api/product"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        names(response.json().await.unwrap()),
        vec!["Aloe gel", "Rose toner", "Argan oil"]
    );

    let response = app
        .client
        .get(app.url("/api/product"))
        .query(&[("category_id", skincare.to_string())])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(
        names(response.json().await.unwrap()),
        vec!["Aloe gel", "Rose toner"]
    );

    let response = app
        .client
        .get(app.url("/api/product"))
        .query(&[
            ("category_id", skincare.to_string()),
            ("search", "A".to_owned()),
        ])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(names(response.json().await.unwrap()), vec!["Aloe gel"]);

    let response = app
        .client
        .get(app.url("/api/product"))
        .query(&[("search", "OIL")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(names(response.json().await.unwrap()), vec!["Argan oil"]);

    app.create_product(&token, product_form("Éclat serum", "30", skincare))
        .await;
    let response = app
        .client
        .get(app.url("/api/product"))
        .query(&[("search", "éCLAT")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(names(response.json().await.unwrap()), vec!["Éclat serum"]);
}

#[tokio::test]
async fn test_price_precision() {
    let app = spawn_app().await;
    let token = app.login("admin").await;
    let category = app.create_category(&token, "Skincare").await;

    let response = app
        .client
        .post(app.url("/api/admin/product"))
        .bearer_auth(&token)
        .multipart(product_form("Aloe gel", "12.345", category))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>().await.unwrap();
    assert_eq!(
        body["fields"]["price"][0],
        "Price can have at most 2 decimal places"
    );
}
