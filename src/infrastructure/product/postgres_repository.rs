//! PostgreSQL product repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::product::{Product, ProductDraft, ProductRepository};
use crate::domain::DomainError;

const SELECT_COLUMNS: &str = "SELECT id, prod_name, prod_price, prod_desc FROM products";

/// PostgreSQL implementation of ProductRepository
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list products: {}", e)))?;

        rows.iter().map(row_to_product).collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get product: {}", e)))?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        // strpos treats the fragment literally, unlike LIKE wildcards
        let rows = sqlx::query(&format!(
            "{} WHERE strpos(prod_name, $1) > 0 ORDER BY id",
            SELECT_COLUMNS
        ))
        .bind(fragment)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to filter products: {}", e)))?;

        rows.iter().map(row_to_product).collect()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO products (prod_name, prod_price, prod_desc)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&draft.prod_name)
        .bind(draft.prod_price)
        .bind(&draft.prod_desc)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create product: {}", e)))?;

        Ok(Product::from_draft(id, draft))
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET prod_name = $2, prod_price = $3, prod_desc = $4
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.prod_name)
        .bind(product.prod_price)
        .bind(&product.prod_desc)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update product: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete product: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_product(row: &sqlx::postgres::PgRow) -> Result<Product, DomainError> {
    let read = |e: sqlx::Error| DomainError::storage(format!("Invalid product row: {}", e));

    Ok(Product {
        id: row.try_get("id").map_err(read)?,
        prod_name: row.try_get("prod_name").map_err(read)?,
        prod_price: row.try_get("prod_price").map_err(read)?,
        prod_desc: row.try_get("prod_desc").map_err(read)?,
    })
}
