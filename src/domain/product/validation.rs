//! Product validation utilities

use thiserror::Error;

use super::entity::ProductDraft;

/// Errors that can occur during product validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductValidationError {
    #[error("Product name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Product price must be a finite number")]
    PriceNotFinite,

    #[error("Product price cannot be negative")]
    NegativePrice,
}

/// Column width of `products.prod_name`
pub const MAX_PRODUCT_NAME_LENGTH: usize = 50;

/// Validate a product draft
///
/// Rules:
/// - Name, if present, at most 50 characters
/// - Price, if present, finite and not negative
pub fn validate_product(draft: &ProductDraft) -> Result<(), ProductValidationError> {
    if let Some(name) = &draft.prod_name {
        if name.chars().count() > MAX_PRODUCT_NAME_LENGTH {
            return Err(ProductValidationError::NameTooLong(MAX_PRODUCT_NAME_LENGTH));
        }
    }

    if let Some(price) = draft.prod_price {
        if !price.is_finite() {
            return Err(ProductValidationError::PriceNotFinite);
        }

        if price < 0.0 {
            return Err(ProductValidationError::NegativePrice);
        }
    }

    Ok(())
}
