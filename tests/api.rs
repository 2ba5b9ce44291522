use std::sync::Arc;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use olas_storefront::api::{router, AppState};
use olas_storefront::import::{parse_file, ImportRequest};
use olas_storefront::media::{MediaError, MediaUploader, UnconfiguredUploader, UploadedMedia};
use olas_storefront::store::MemoryCatalogStore;
use serde_json::{json, Value};
use tower::ServiceExt;

struct StubUploader;

#[async_trait]
impl MediaUploader for StubUploader {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedMedia, MediaError> {
        Ok(UploadedMedia { url: format!("https://cdn.test/{file_name}?{}", bytes.len()), public_id: format!("products/{file_name}") })
    }
}

fn app() -> Router {
    router(AppState { store: Arc::new(MemoryCatalogStore::new()), media: Arc::new(StubUploader) })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).expect("request")).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).expect("json body") };
    (status, json)
}

fn ring(sku: &str) -> Value {
    json!({"name": "Ring", "description": "A ring", "price": 19.99, "category": "productos", "stock": 5, "sku": sku})
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, Method::POST, "/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let (status, json) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_create_then_get_preserves_fields() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/products", Some(ring("SKU1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Product created successfully");

    let id = json["data"]["id"].as_str().unwrap().to_string();
    let (status, json) = send(&app, Method::GET, &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let p = &json["data"];
    assert_eq!(p["name"], "Ring");
    assert_eq!(p["description"], "A ring");
    assert_eq!(p["price"].as_f64(), Some(19.99));
    assert_eq!(p["stock"].as_i64(), Some(5));
    assert_eq!(p["category"], "productos");
    assert_eq!(p["sku"], "SKU1");
    assert_eq!(p["isActive"], true);
    assert!(p["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_rejects_invalid_fields() {
    let app = app();
    for body in [
        json!({"name": "Ring", "price": -1, "category": "productos"}),
        json!({"name": "Ring", "price": 1, "stock": -2, "category": "productos"}),
        json!({"name": "Ring", "price": 1, "category": "joyas"}),
        json!({"price": 1, "category": "productos"}),
        json!({"name": "Ring", "category": "productos"}),
    ] {
        let (status, json) = send(&app, Method::POST, "/products", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    }
    let (_, json) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_malformed_body_uses_envelope() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_duplicate_sku_second_create_fails() {
    let app = app();
    let first = create(&app, ring("DUP")).await;
    let (status, json) = send(&app, Method::POST, "/products", Some(ring("DUP"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (_, json) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(json["data"], json!([first]));
}

#[tokio::test]
async fn test_list_active_newest_first_with_category() {
    let app = app();
    let a = create(&app, json!({"name": "A", "price": 1, "category": "material"})).await;
    let b = create(&app, json!({"name": "B", "price": 2, "category": "novedades"})).await;
    let c = create(&app, json!({"name": "C", "price": 3, "category": "descuentos"})).await;
    assert_eq!(c["category"], "ofertas");

    let hidden = format!("/products/{}", b["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::PUT, &hidden, Some(json!({"isActive": false}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, Method::GET, "/products", None).await;
    let names: Vec<&str> = json["data"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["C", "A"]);

    let (_, json) = send(&app, Method::GET, "/products?category=material", None).await;
    assert_eq!(json["data"], json!([a]));
    let (_, json) = send(&app, Method::GET, "/products?category=novedades", None).await;
    assert_eq!(json["data"], json!([]));
    let (status, json) = send(&app, Method::GET, "/products?category=joyas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_get_invalid_and_missing_ids() {
    let app = app();
    let (status, json) = send(&app, Method::GET, "/products/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"success": false, "error": "Invalid product id"}));

    let missing = format!("/products/{}", uuid::Uuid::now_v7());
    let (status, json) = send(&app, Method::GET, &missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"success": false, "error": "Product not found"}));
}

#[tokio::test]
async fn test_update_is_partial_and_revalidated() {
    let app = app();
    let created = create(&app, ring("SKU1")).await;
    let uri = format!("/products/{}", created["id"].as_str().unwrap());

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({"stock": 8}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Product updated successfully");
    assert_eq!(json["data"]["stock"].as_i64(), Some(8));
    assert_eq!(json["data"]["price"].as_f64(), Some(19.99));
    assert_eq!(json["data"]["isActive"], true);

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"price": -5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({"category": "joyas"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/products/{}", uuid::Uuid::now_v7());
    let (status, _) = send(&app, Method::PUT, &missing, Some(json!({"stock": 1}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete() {
    let app = app();
    let created = create(&app, ring("SKU1")).await;
    let uri = format!("/products/{}", created["id"].as_str().unwrap());

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "message": "Product deleted successfully"}));

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_csv_file() {
    let app = app();
    let csv = "name,description,price,stock,category,sku\nRing,A ring,19.99,5,productos,SKU1\n,Nameless,1,1,productos,SKU2\n";
    let request = ImportRequest { products: parse_file("catalog.csv", csv).unwrap() };
    let (status, json) = send(&app, Method::POST, "/products/import", Some(serde_json::to_value(&request).unwrap())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["imported"], 1);
    assert_eq!(json["message"], "1 products imported successfully");

    let (_, json) = send(&app, Method::GET, "/products", None).await;
    let p = &json["data"][0];
    assert_eq!(p["price"].as_f64(), Some(19.99));
    assert_eq!(p["stock"].as_i64(), Some(5));
}

#[tokio::test]
async fn test_import_single_json_object() {
    let app = app();
    let request = ImportRequest { products: parse_file("one.json", r#"{"name": "Chain", "price": "4.50"}"#).unwrap() };
    let (status, json) = send(&app, Method::POST, "/products/import", Some(serde_json::to_value(&request).unwrap())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["imported"], 1);

    let (_, json) = send(&app, Method::GET, "/products?category=productos", None).await;
    let p = &json["data"][0];
    assert_eq!(p["price"].as_f64(), Some(4.5));
    assert_eq!(p["stock"].as_i64(), Some(0));
    assert!(p["sku"].as_str().unwrap().starts_with("SKU-"));
}

#[tokio::test]
async fn test_import_failures() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/products/import", Some(json!({"products": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"success": false, "error": "No products provided"}));

    create(&app, ring("TAKEN")).await;
    let batch = json!({"products": [{"name": "X", "sku": "FRESH"}, {"name": "Y", "sku": "TAKEN"}]});
    let (status, json) = send(&app, Method::POST, "/products/import", Some(batch)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    let (_, json) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

fn multipart_request(field: &str) -> Request<Body> {
    multipart_with_payload(field, b"PNGDATA")
}

fn multipart_with_payload(field: &str, payload: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--BOUNDARY\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"ring.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(payload);
    body.extend_from_slice(b"\r\n--BOUNDARY--\r\n");
    Request::builder()
        .method(Method::POST)
        .uri("/media/upload")
        .header(header::CONTENT_TYPE, "multipart/form-data; boundary=BOUNDARY")
        .body(Body::from(body))
        .unwrap()
}

async fn json_response(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_media_upload() {
    let (status, json) = json_response(app(), multipart_request("file")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"success": true, "url": "https://cdn.test/ring.png?7", "public_id": "products/ring.png"}));
}

#[tokio::test]
async fn test_media_upload_without_file() {
    let (status, json) = json_response(app(), multipart_request("other")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({"error": "No file provided"}));
}

#[tokio::test]
async fn test_media_upload_unconfigured() {
    let app = router(AppState { store: Arc::new(MemoryCatalogStore::new()), media: Arc::new(UnconfiguredUploader) });
    let (status, json) = json_response(app, multipart_request("file")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Upload failed");
    assert_eq!(json["details"], "media service not configured");
}

#[tokio::test]
async fn test_media_upload_accepts_large_photo() {
    let photo = vec![b'x'; 3 * 1024 * 1024];
    let (status, json) = json_response(app(), multipart_with_payload("file", &photo)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["url"], format!("https://cdn.test/ring.png?{}", photo.len()));
}

#[tokio::test]
async fn test_media_upload_rejects_non_multipart_with_error_shape() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/media/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = json_response(app(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Server error");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_import_numeric_sku() {
    let app = app();
    let body = json!({"products": [{"name": "Ring", "price": 5, "sku": 12345}]});
    let (status, json) = send(&app, Method::POST, "/products/import", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["imported"], 1);
    let (_, json) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(json["data"][0]["sku"], "12345");
}
