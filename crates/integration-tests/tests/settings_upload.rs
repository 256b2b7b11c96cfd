//! Site settings and image uploads.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use trailforge_integration_tests::{TestApp, error_message, json_body};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn image_form(field: &str, file_name: &str, mime: &str) -> Form {
    let part = Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .unwrap();
    Form::new().part(field.to_string(), part)
}

async fn upload(app: &TestApp, form: Form) -> reqwest::Response {
    app.client
        .post(app.url("/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_created_on_first_read() {
    let app = TestApp::spawn().await;

    let settings = json_body(app.get("/settings").await).await;
    assert_eq!(settings["id"], "settings");
    assert_eq!(settings["heroBackgroundImage"], Value::Null);
}

#[tokio::test]
async fn test_settings_update() {
    let app = TestApp::spawn().await;

    let resp = app
        .put_json("/settings", &json!({ "heroBackgroundImage": "/uploads/hero.jpg" }))
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    app.login().await;
    let resp = app
        .put_json("/settings", &json!({ "heroBackgroundImage": "/uploads/hero.jpg" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Absent keeps the image
    let kept = json_body(app.put_json("/settings", &json!({})).await).await;
    assert_eq!(kept["heroBackgroundImage"], "/uploads/hero.jpg");

    // Null clears it
    let cleared = json_body(
        app.put_json("/settings", &json!({ "heroBackgroundImage": null }))
            .await,
    )
    .await;
    assert_eq!(cleared["heroBackgroundImage"], Value::Null);

    let public = json_body(app.get("/settings").await).await;
    assert_eq!(public["heroBackgroundImage"], Value::Null);
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_bmp_is_rejected() {
    let app = TestApp::spawn().await;
    app.login().await;

    let resp = upload(&app, image_form("file", "boot.bmp", "image/bmp")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(resp).await,
        "Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed."
    );
    assert!(app.images.as_ref().unwrap().is_empty().await);
}

#[tokio::test]
async fn test_png_upload_is_stored() {
    let app = TestApp::spawn().await;
    app.login().await;

    let resp = upload(&app, image_form("file", "boot.png", "image/png")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let url = json_body(resp).await["url"].as_str().unwrap().to_string();

    assert!(url.contains("/uploads/"));
    assert!(url.ends_with(".png"));
    let (bytes, content_type) = app.images.as_ref().unwrap().get(&url).await.unwrap();
    assert_eq!(bytes, PNG_BYTES);
    assert_eq!(content_type, "image/png");
}

#[tokio::test]
async fn test_local_upload_is_served() {
    let app = TestApp::spawn_with_disk().await;
    app.login().await;

    let resp = upload(&app, image_form("file", "boot.png", "image/png")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let url = json_body(resp).await["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));

    let served = app.get(&url).await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = TestApp::spawn().await;
    app.login().await;

    let resp = upload(&app, image_form("picture", "boot.png", "image/png")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "No file uploaded");
}

#[tokio::test]
async fn test_upload_requires_admin() {
    let app = TestApp::spawn().await;

    let resp = upload(&app, image_form("file", "boot.png", "image/png")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_replaced_hero_image_is_deleted() {
    let app = TestApp::spawn().await;
    app.login().await;
    let images = app.images.as_ref().unwrap();

    let first = json_body(upload(&app, image_form("file", "a.png", "image/png")).await).await;
    let second = json_body(upload(&app, image_form("file", "b.png", "image/png")).await).await;

    app.put_json("/settings", &json!({ "heroBackgroundImage": first["url"] }))
        .await;
    app.put_json("/settings", &json!({ "heroBackgroundImage": second["url"] }))
        .await;

    let first_url = first["url"].as_str().unwrap();
    for _ in 0..100 {
        if images.get(first_url).await.is_none() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(images.get(first_url).await.is_none());
    assert!(images.get(second["url"].as_str().unwrap()).await.is_some());
}
