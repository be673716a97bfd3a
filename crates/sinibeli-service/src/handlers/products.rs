//! Product handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use sinibeli_core::{Entity, Product};

use crate::error::{invalid_id, ApiError};
use crate::state::AppState;

/// Product fields accepted on create and update.
#[derive(Debug, Deserialize)]
pub struct ProductFields {
    /// Display name.
    pub product_name: String,
    /// Fee as a decimal string, e.g. `"2.50"`.
    pub service_fee: String,
    /// Whether the fee is a percentage rather than a flat amount.
    pub service_fee_percentage: bool,
}

impl ProductFields {
    fn into_product(self, id: i64) -> Result<Product, ApiError> {
        let service_fee = Decimal::from_str(self.service_fee.trim())
            .map_err(|_| ApiError::bad_request("invalid service_fee format"))?;

        Ok(Product {
            id,
            product_name: self.product_name,
            service_fee,
            service_fee_percentage: self.service_fee_percentage,
        })
    }
}

/// Create product request.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Caller-chosen id.
    pub id: i64,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: ProductFields,
}

/// Create a product.
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(body) = body?;
    let product = body.fields.into_product(body.id)?;
    let product = state.products().create(product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by id.
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Product))?;
    Ok(Json(state.products().get(id).await?))
}

/// List all products.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products().list().await?))
}

/// Update a product.
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Product))?;
    let Json(body) = body?;
    let product = body.into_product(id)?;
    Ok(Json(state.products().update(product).await?))
}

/// Delete a product.
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Product))?;
    state.products().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
