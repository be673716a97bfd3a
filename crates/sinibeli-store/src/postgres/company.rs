use async_trait::async_trait;

use sinibeli_core::{Company, Entity};

use super::PgStore;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::CompanyRepository;

const SELECT_COMPANY: &str =
    "SELECT id, name, type AS company_type, address, city FROM company";

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: i64,
    name: String,
    company_type: String,
    address: String,
    city: String,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company_type: row.company_type,
            address: row.address,
            city: row.city,
        }
    }
}

#[async_trait]
impl CompanyRepository for PgStore {
    async fn create_company(&self, company: &Company) -> Result<()> {
        sqlx::query("INSERT INTO company (id, name, type, address, city) VALUES ($1, $2, $3, $4, $5)")
            .bind(company.id)
            .bind(&company.name)
            .bind(&company.company_type)
            .bind(&company.address)
            .bind(&company.city)
            .execute(self.pool())
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyExists {
                        entity: Entity::Company,
                        id: company.id,
                    }
                } else {
                    StoreError::database("failed to create company", e)
                }
            })?;

        tracing::debug!(company_id = company.id, "Company row inserted");
        Ok(())
    }

    async fn get_company(&self, id: i64) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!("{SELECT_COMPANY} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to get company", e))?;
        Ok(row.map(Company::from))
    }

    async fn list_companies(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query_as::<_, CompanyRow>(&format!("{SELECT_COMPANY} ORDER BY id"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to list companies", e))?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn update_company(&self, company: &Company) -> Result<()> {
        let result = sqlx::query(
            "UPDATE company SET name = $1, type = $2, address = $3, city = $4 WHERE id = $5",
        )
        .bind(&company.name)
        .bind(&company.company_type)
        .bind(&company.address)
        .bind(&company.city)
        .bind(company.id)
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::database("failed to update company", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_company(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM company WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to delete company", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
