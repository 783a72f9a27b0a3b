//! Product catalog service

use std::sync::Arc;

use tracing::info;

use crate::domain::product::{validate_product, Product, ProductDraft, ProductRepository};
use crate::domain::DomainError;

const NOT_FOUND: &str = "Product not found.";

/// Catalog operations over a product repository
#[derive(Debug, Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<Product>, DomainError> {
        self.repository.list().await
    }

    /// Get a product by ID, failing with `NotFound` when absent
    pub async fn get(&self, id: i64) -> Result<Product, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    /// Products whose name contains `fragment`, case-sensitive
    pub async fn find_by_name(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        self.repository.find_by_name(fragment).await
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        validate_product(&draft).map_err(|e| DomainError::validation(e.to_string()))?;

        let product = self.repository.create(draft).await?;
        info!(product_id = product.id, "Product added");

        Ok(product)
    }

    /// Replace the fields of an existing product
    pub async fn update(&self, id: i64, draft: ProductDraft) -> Result<Product, DomainError> {
        validate_product(&draft).map_err(|e| DomainError::validation(e.to_string()))?;

        let product = Product::from_draft(id, draft);
        let updated = self
            .repository
            .update(&product)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))?;

        info!(product_id = id, "Product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if !self.repository.delete(id).await? {
            return Err(DomainError::not_found(NOT_FOUND));
        }

        info!(product_id = id, "Product deleted");
        Ok(())
    }
}
