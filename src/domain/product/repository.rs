//! Product repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Product, ProductDraft};
use crate::domain::DomainError;

/// Repository trait for product storage
#[async_trait]
pub trait ProductRepository: Send + Sync + Debug {
    /// List all products ordered by ID
    async fn list(&self) -> Result<Vec<Product>, DomainError>;

    /// Get a product by ID
    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError>;

    /// List products whose name contains `fragment` (case-sensitive)
    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Product>, DomainError>;

    /// Insert a product and return it with its assigned ID
    async fn create(&self, draft: ProductDraft) -> Result<Product, DomainError>;

    /// Overwrite an existing product, returning `None` if it does not exist
    async fn update(&self, product: &Product) -> Result<Option<Product>, DomainError>;

    /// Delete a product, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;
}
