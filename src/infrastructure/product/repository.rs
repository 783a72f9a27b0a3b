//! In-memory product repository implementation

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::product::{Product, ProductDraft, ProductRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct ProductTable {
    products: BTreeMap<i64, Product>,
    next_id: i64,
}

/// In-memory implementation of ProductRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    table: Arc<RwLock<ProductTable>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.table.read().await.products.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, DomainError> {
        Ok(self.table.read().await.products.get(&id).cloned())
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<Product>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .products
            .values()
            .filter(|p| p.name_contains(fragment))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let mut table = self.table.write().await;

        table.next_id += 1;
        let product = Product::from_draft(table.next_id, draft);
        table.products.insert(product.id, product.clone());

        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>, DomainError> {
        let mut table = self.table.write().await;

        match table.products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.table.write().await.products.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, price: f64) -> ProductDraft {
        ProductDraft {
            prod_name: Some(name.to_string()),
            prod_price: Some(price),
            prod_desc: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = InMemoryProductRepository::new();

        let a = repo.create(draft("Keyboard", 10.0)).await.unwrap();
        let b = repo.create(draft("Mouse", 5.0)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(draft("Keyboard", 10.0)).await.unwrap();

        assert!(repo.delete(a.id).await.unwrap());
        assert!(!repo.delete(a.id).await.unwrap());

        let b = repo.create(draft("Mouse", 5.0)).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let repo = InMemoryProductRepository::new();
        repo.create(draft("Mechanical Keyboard", 80.0)).await.unwrap();
        repo.create(draft("Mouse", 5.0)).await.unwrap();
        repo.create(draft("Keyboard cover", 3.0)).await.unwrap();

        let found = repo.find_by_name("Keyboard").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(repo.find_by_name("keyboard").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = InMemoryProductRepository::new();
        let product = Product::from_draft(42, draft("Ghost", 1.0));

        assert!(repo.update(&product).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_existing() {
        let repo = InMemoryProductRepository::new();
        let mut product = repo.create(draft("Keyboard", 10.0)).await.unwrap();
        product.prod_price = Some(12.5);

        let updated = repo.update(&product).await.unwrap().unwrap();
        assert_eq!(updated.prod_price, Some(12.5));
        assert_eq!(repo.get(product.id).await.unwrap(), Some(updated));
    }
}
