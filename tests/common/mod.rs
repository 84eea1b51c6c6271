//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;

use garagem::models::car::Car;
use garagem::{app, ensure_entity_table, AppState};

/// Create the car table in the per-test database and build the same
/// router `main` serves.
pub async fn build_test_app(pool: PgPool) -> Router {
    ensure_entity_table::<Car>(&pool).await.unwrap();
    app(AppState { pool })
}

pub async fn get(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, path: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn request_json(
    app: Router,
    method: Method,
    path: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    request_json(app, Method::POST, path, body).await
}

pub async fn put_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    request_json(app, Method::PUT, path, body).await
}

pub async fn patch_json(app: Router, path: &str, body: serde_json::Value) -> Response {
    request_json(app, Method::PATCH, path, body).await
}

/// POST a single-file multipart form with the given filename and content.
pub async fn post_file(app: Router, path: &str, file_name: &str, content: &str) -> Response {
    let boundary = "garagem-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
