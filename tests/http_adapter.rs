//! The axum hosting adapter.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use craft_router::config::CraftConfig;
use craft_router::lifecycle::build_router;
use craft_router::HttpServer;
use std::sync::Arc;
use tower::ServiceExt;

mod common;

fn server(router: craft_router::Router) -> HttpServer {
    HttpServer::new(CraftConfig::default(), Arc::new(router))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_dispatch_through_axum() {
    let app = server(common::fixture_router()).app();
    let response = app
        .oneshot(Request::builder().uri("/users/0").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "user ada");
}

#[tokio::test]
async fn test_internal_error_is_generic_500() {
    let app = server(common::fixture_router()).app();
    let response = app
        .oneshot(Request::builder().uri("/ghost").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "500 Internal Server Error");
}

#[tokio::test]
async fn test_method_not_allowed_header() {
    let app = server(common::fixture_router()).app();
    let response = app
        .oneshot(Request::builder().method("DELETE").uri("/a").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET");
}

#[tokio::test]
async fn test_demo_app_csrf_and_auth() {
    let config = CraftConfig::default();
    let app = HttpServer::new(config.clone(), Arc::new(build_router(&config).unwrap())).app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/account/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Unauthorized access!");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/account/profile")
                .header(header::AUTHORIZATION, "Bearer t")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("_csrf=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 419);
    assert_eq!(body_text(response).await, "CSRF token mismatch!");

    let body = format!("_csrf={}", config.security.csrf_token);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/account/profile")
                .header(header::AUTHORIZATION, "Bearer t")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"updated":true}"#);
}

#[tokio::test]
async fn test_demo_app_pages() {
    let config = CraftConfig::default();
    let app = HttpServer::new(config.clone(), Arc::new(build_router(&config).unwrap())).app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::HOST, "example.test")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome to Craft"));
    assert!(html.contains("http://example.test/hello/world"));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/hello/%3Cb%3E")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "Hello, %3Cb%3E");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/hello/bob").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_text(response).await, r#"{"message":"Hello, bob"}"#);

    let response = app
        .oneshot(Request::builder().uri("/does/not/exist").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Error 404"));
}

#[tokio::test]
async fn test_served_over_tcp() {
    let (addr, shutdown) = common::spawn_server(CraftConfig::default(), common::fixture_router()).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let res = client
        .get(format!("http://{addr}/api/users"))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["users"][1], "grace");

    let res = client.get(format!("http://{addr}/x")).send().await.unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
}
