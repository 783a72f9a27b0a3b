//! Product catalog endpoints
//!
//! Reads are public; add, update and delete require a bearer token.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::product::{Product, ProductDraft};

/// Create the product router
pub fn create_product_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(add_product).put(update_product))
        .route("/fetch/{id}", get(fetch_product))
        // Same segment: a name for GET, an ID for DELETE
        .route("/{key}", get(filter_products).delete(delete_product))
}

/// Update request: the product ID plus replacement fields
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub id: i64,
    #[serde(flatten)]
    pub fields: ProductDraft,
}

#[derive(Debug, Serialize)]
pub struct ProductMessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

impl ProductMessageResponse {
    fn new(message: &str, product: Option<Product>) -> Self {
        Self {
            message: message.to_string(),
            product,
        }
    }
}

/// GET /api/product
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.product_service.list().await?))
}

/// GET /api/product/fetch/{id}
pub async fn fetch_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.product_service.get(id).await?))
}

/// GET /api/product/{name}
pub async fn filter_products(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.product_service.find_by_name(&name).await?))
}

/// POST /api/product
pub async fn add_product(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<ProductMessageResponse>, ApiError> {
    debug!(username = %claims.username, "Adding product");
    let product = state.product_service.create(draft).await?;

    Ok(Json(ProductMessageResponse::new(
        "Product Added Successfully!",
        Some(product),
    )))
}

/// PUT /api/product
pub async fn update_product(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductMessageResponse>, ApiError> {
    debug!(username = %claims.username, product_id = request.id, "Updating product");
    let product = state
        .product_service
        .update(request.id, request.fields)
        .await?;

    Ok(Json(ProductMessageResponse::new(
        "Product Updated Successfully!",
        Some(product),
    )))
}

/// DELETE /api/product/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<ProductMessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    debug!(username = %claims.username, product_id = id, "Deleting product");
    state.product_service.delete(id).await?;

    Ok(Json(ProductMessageResponse::new(
        "Product Deleted Successfully!",
        None,
    )))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(format!("Invalid product ID '{}'", raw)).with_param("id")
    })
}
