use async_trait::async_trait;
use chrono::NaiveDate;

use sinibeli_core::{Customer, Entity};

use super::PgStore;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::CustomerRepository;

const SELECT_CUSTOMER: &str = "SELECT id, first_name, last_name, birth_date, email, \
     phone_number, address, gender, company AS company_id, photo FROM customer";

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    first_name: String,
    last_name: String,
    birth_date: Option<NaiveDate>,
    email: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    company_id: i64,
    photo: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            email: row.email,
            phone_number: row.phone_number,
            address: row.address,
            gender: row.gender,
            company_id: row.company_id,
            photo: row.photo,
        }
    }
}

#[async_trait]
impl CustomerRepository for PgStore {
    async fn create_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            "INSERT INTO customer (id, first_name, last_name, birth_date, email, \
             phone_number, address, gender, company, photo) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(customer.id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.birth_date)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(&customer.gender)
        .bind(customer.company_id)
        .bind(&customer.photo)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists {
                    entity: Entity::Customer,
                    id: customer.id,
                }
            } else {
                StoreError::database("failed to create customer", e)
            }
        })?;

        tracing::debug!(customer_id = customer.id, "Customer row inserted");
        Ok(())
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!("{SELECT_CUSTOMER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to get customer", e))?;
        Ok(row.map(Customer::from))
    }

    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!("{SELECT_CUSTOMER} ORDER BY id"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to list customers", e))?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        let result = sqlx::query(
            "UPDATE customer SET first_name = $1, last_name = $2, birth_date = $3, \
             email = $4, phone_number = $5, address = $6, gender = $7, company = $8, \
             photo = $9 WHERE id = $10",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.birth_date)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(&customer.gender)
        .bind(customer.company_id)
        .bind(&customer.photo)
        .bind(customer.id)
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::database("failed to update customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_customer(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM customer WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to delete customer", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
