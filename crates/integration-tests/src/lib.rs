//! Integration tests for Trailforge.
//!
//! Each test spawns the real router on an ephemeral port, backed by the
//! in-memory stores and an in-memory session store, and talks to it over
//! HTTP with `reqwest`. No database or object store is needed.
//!
//! ```bash
//! cargo test -p trailforge-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode, redirect::Policy};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower_sessions::MemoryStore as SessionMemoryStore;

use trailforge_server::middleware::create_session_layer;
use trailforge_server::routes;
use trailforge_server::services::PasswordGate;
use trailforge_server::state::AppState;
use trailforge_server::storage::{LocalDiskStore, MemoryObjectStore, ObjectStore};

/// Password accepted by every test server.
pub const ADMIN_PASSWORD: &str = "trail-test-password-2026";

/// Upload limit for test servers.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024;

/// A running test server and a cookie-aware client for it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    /// Present when the server stores images in memory.
    pub images: Option<Arc<MemoryObjectStore>>,
    _upload_dir: Option<TempDir>,
}

impl TestApp {
    /// Spawn a server that keeps images in memory.
    pub async fn spawn() -> Self {
        let memory = Arc::new(MemoryObjectStore::new());
        let images: Arc<dyn ObjectStore> = memory.clone();
        let state = AppState::in_memory(images, password_gate(), MAX_UPLOAD_BYTES);

        Self::serve(state, Some(memory), None).await
    }

    /// Spawn a server that writes images to a temporary directory and serves
    /// them under `/uploads`.
    pub async fn spawn_with_disk() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create upload dir");
        let disk = LocalDiskStore::new(dir.path().to_path_buf());
        let uploads_dir = disk.uploads_dir();
        let state = AppState::in_memory(Arc::new(disk), password_gate(), MAX_UPLOAD_BYTES)
            .with_uploads_dir(uploads_dir);

        Self::serve(state, None, Some(dir)).await
    }

    async fn serve(
        state: AppState,
        images: Option<Arc<MemoryObjectStore>>,
        upload_dir: Option<TempDir>,
    ) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let app = routes::app(
            state,
            create_session_layer(SessionMemoryStore::default(), false),
        );
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            images,
            _upload_dir: upload_dir,
        }
    }

    /// Absolute URL for a path on the test server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Log the client in with the shared password.
    pub async fn login(&self) {
        let resp = self
            .client
            .post(self.url("/admin/auth"))
            .json(&json!({ "password": ADMIN_PASSWORD }))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::OK);
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    pub async fn patch_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PATCH failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Create a product as admin and return its JSON.
    pub async fn create_product(&self, body: &Value) -> Value {
        let resp = self.post_json("/products", body).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        json_body(resp).await
    }
}

fn password_gate() -> PasswordGate {
    PasswordGate::new(&SecretString::from(ADMIN_PASSWORD))
}

/// Parse a response body as JSON.
pub async fn json_body(resp: Response) -> Value {
    resp.json().await.expect("Response was not JSON")
}

/// The `error` message of an error response.
pub async fn error_message(resp: Response) -> String {
    json_body(resp).await["error"]
        .as_str()
        .expect("Missing error message")
        .to_string()
}

/// A valid product body with the given name and tags.
pub fn boot(name: &str, categories: &[&str], sub_categories: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{name} for every season"),
        "price": "119.00",
        "imageUrl": format!("https://cdn.example/{name}.jpg"),
        "categories": categories,
        "subCategories": sub_categories,
    })
}

/// Product names from a product list response, in order.
pub fn names(products: &Value) -> Vec<String> {
    products
        .as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|p| p["name"].as_str().expect("Missing name").to_string())
        .collect()
}
