//! Company handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use sinibeli_core::{Company, Entity};

use crate::error::{invalid_id, ApiError};
use crate::state::AppState;

/// Company fields accepted on create and update.
#[derive(Debug, Deserialize)]
pub struct CompanyFields {
    /// Display name.
    pub name: String,
    /// Business type.
    #[serde(rename = "type")]
    pub company_type: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
}

impl CompanyFields {
    fn into_company(self, id: i64) -> Company {
        Company {
            id,
            name: self.name,
            company_type: self.company_type,
            address: self.address,
            city: self.city,
        }
    }
}

/// Create company request.
#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    /// Caller-chosen id.
    pub id: i64,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: CompanyFields,
}

/// Create a company.
pub async fn create_company(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Company>), ApiError> {
    let Json(body) = body?;
    let company = state
        .companies()
        .create(body.fields.into_company(body.id))
        .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// Get a company by id.
pub async fn get_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Company>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Company))?;
    Ok(Json(state.companies().get(id).await?))
}

/// List all companies.
pub async fn list_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(state.companies().list().await?))
}

/// Update a company.
pub async fn update_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CompanyFields>, JsonRejection>,
) -> Result<Json<Company>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Company))?;
    let Json(body) = body?;
    Ok(Json(state.companies().update(body.into_company(id)).await?))
}

/// Delete a company.
pub async fn delete_company(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Company))?;
    state.companies().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
