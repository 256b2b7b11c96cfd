//! Back-office login, logout and the page guard.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::json;

use trailforge_integration_tests::{TestApp, error_message, json_body};

#[tokio::test]
async fn test_wrong_password() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_json("/admin/auth", &json!({ "password": "hunter2" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(resp).await, "Invalid password");
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_json(
            "/admin/auth",
            &json!({ "password": trailforge_integration_tests::ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("trailforge_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert_eq!(json_body(resp).await, json!({ "success": true }));
}

#[tokio::test]
async fn test_guard_redirects_to_login() {
    let app = TestApp::spawn().await;

    let resp = app.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(LOCATION).unwrap(),
        "/admin/login?redirect=%2Fadmin"
    );

    // The login page itself is reachable
    let status = json_body(app.get("/admin/login?redirect=/admin/messages").await).await;
    assert_eq!(
        status,
        json!({ "authenticated": false, "redirect": "/admin/messages" })
    );
}

#[tokio::test]
async fn test_dashboard_after_login() {
    let app = TestApp::spawn().await;
    app.post_json(
        "/messages",
        &json!({ "name": "Dana", "email": "dana@northwind.example", "message": "Hello" }),
    )
    .await;

    app.login().await;
    let resp = app.get("/admin").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let summary = json_body(resp).await;
    assert_eq!(summary["productCount"], 0);
    assert_eq!(summary["featuredCount"], 0);
    assert_eq!(
        summary["messages"],
        json!({ "new": 1, "contacted": 0, "completed": 0, "total": 1 })
    );

    let status = json_body(app.get("/admin/login").await).await;
    assert_eq!(status["authenticated"], true);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn().await;
    app.login().await;
    assert_eq!(app.get("/admin").await.status(), StatusCode::OK);

    let resp = app.delete("/admin/auth").await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(app.get("/admin").await.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.get("/messages").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::spawn().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}
