//! Product catalog domain

mod entity;
mod repository;
mod validation;

pub use entity::{Product, ProductDraft};
pub use repository::ProductRepository;
pub use validation::{validate_product, ProductValidationError, MAX_PRODUCT_NAME_LENGTH};
