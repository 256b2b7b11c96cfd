//! Product catalog route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use tracing::instrument;

use trailforge_core::ProductId;

use crate::error::{ApiJson, ApiPath, ApiQuery, AppError};
use crate::middleware::RequireAdmin;
use crate::models::{Product, ProductFilter};
use crate::services::{CatalogService, ProductInput, ReorderItem};
use crate::state::AppState;

/// Build the products router.
///
/// `/products/reorder` is registered before `/products/{id}` so it never
/// parses as an id.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/reorder", put(reorder))
        .route("/products/{id}", get(show).put(update).delete(destroy))
}

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub featured: Option<bool>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(query: ProductQuery) -> Self {
        Self {
            category: query.category,
            sub_category: query.sub_category,
            featured: query.featured,
        }
    }
}

/// Body of `PUT /products/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub products: Vec<ReorderItem>,
}

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.products(), state.images())
}

/// List products in display order.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = catalog(&state).list(&query.into()).await?;
    Ok(Json(products))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(catalog(&state).get(id).await?))
}

/// Create a product.
#[instrument(skip(state, _admin, input))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = catalog(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product with the fields present in the body.
#[instrument(skip(state, _admin, input))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(catalog(&state).update(id, input).await?))
}

/// Delete a product and return it.
#[instrument(skip(state, _admin))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(catalog(&state).delete(id).await?))
}

/// Apply a batch of display positions atomically.
#[instrument(skip(state, _admin, body), fields(count = body.products.len()))]
pub async fn reorder(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ReorderRequest>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(catalog(&state).reorder(&body.products).await?))
}
