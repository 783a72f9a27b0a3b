//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::product::ProductService;
use crate::infrastructure::user::CredentialService;

/// Services shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub credential_service: Arc<CredentialService>,
    pub product_service: Arc<ProductService>,
}

impl AppState {
    pub fn new(credential_service: CredentialService, product_service: ProductService) -> Self {
        Self {
            credential_service: Arc::new(credential_service),
            product_service: Arc::new(product_service),
        }
    }
}
