//! Customer handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use sinibeli_core::{Customer, Entity};

use crate::error::{invalid_id, ApiError};
use crate::state::AppState;

/// Customer fields accepted on create and update.
///
/// Optional strings may be omitted or empty; both mean "not set".
#[derive(Debug, Deserialize)]
pub struct CustomerFields {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Date of birth, `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Owning company.
    pub company_id: i64,
    /// Photo URL.
    #[serde(default)]
    pub photo: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CustomerFields {
    fn into_customer(self, id: i64) -> Result<Customer, ApiError> {
        let birth_date = non_empty(self.birth_date)
            .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| {
                ApiError::bad_request("invalid birth_date format, use YYYY-MM-DD")
                    .with_example("1990-05-17")
            })?;

        Ok(Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date,
            email: non_empty(self.email),
            phone_number: non_empty(self.phone_number),
            address: non_empty(self.address),
            gender: non_empty(self.gender),
            company_id: self.company_id,
            photo: non_empty(self.photo),
        })
    }
}

/// Create customer request.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Caller-chosen id.
    pub id: i64,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: CustomerFields,
}

/// Create a customer.
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    let Json(body) = body?;
    let customer = body.fields.into_customer(body.id)?;
    let customer = state.customers().create(customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Get a customer by id.
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Customer))?;
    Ok(Json(state.customers().get(id).await?))
}

/// List all customers.
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    Ok(Json(state.customers().list().await?))
}

/// Update a customer.
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<CustomerFields>, JsonRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Customer))?;
    let Json(body) = body?;
    let customer = body.into_customer(id)?;
    Ok(Json(state.customers().update(customer).await?))
}

/// Delete a customer.
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(invalid_id(Entity::Customer))?;
    state.customers().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
