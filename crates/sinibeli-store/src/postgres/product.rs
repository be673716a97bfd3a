use async_trait::async_trait;
use rust_decimal::Decimal;

use sinibeli_core::{Entity, Product};

use super::PgStore;
use crate::error::{is_unique_violation, Result, StoreError};
use crate::ProductRepository;

const SELECT_PRODUCT: &str =
    "SELECT id, product_name, service_fee, service_fee_percentage FROM product";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    product_name: String,
    service_fee: Decimal,
    service_fee_percentage: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            product_name: row.product_name,
            service_fee: row.service_fee,
            service_fee_percentage: row.service_fee_percentage,
        }
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn create_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO product (id, product_name, service_fee, service_fee_percentage) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product.id)
        .bind(&product.product_name)
        .bind(product.service_fee)
        .bind(product.service_fee_percentage)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::AlreadyExists {
                    entity: Entity::Product,
                    id: product.id,
                }
            } else {
                StoreError::database("failed to create product", e)
            }
        })?;

        tracing::debug!(product_id = product.id, "Product row inserted");
        Ok(())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to get product", e))?;
        Ok(row.map(Product::from))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} ORDER BY id"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to list products", e))?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(&self, product: &Product) -> Result<()> {
        let result = sqlx::query(
            "UPDATE product SET product_name = $1, service_fee = $2, \
             service_fee_percentage = $3 WHERE id = $4",
        )
        .bind(&product.product_name)
        .bind(product.service_fee)
        .bind(product.service_fee_percentage)
        .bind(product.id)
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::database("failed to update product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_product(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::database("failed to delete product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
