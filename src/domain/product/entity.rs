//! Product catalog entity

use serde::{Deserialize, Serialize};

/// Product fields supplied by clients on create and update
///
/// The camelCase aliases accept payloads written for the legacy API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default, alias = "prodName")]
    pub prod_name: Option<String>,
    #[serde(default, alias = "prodPrice")]
    pub prod_price: Option<f64>,
    #[serde(default, alias = "prodDesc")]
    pub prod_desc: Option<String>,
}

/// Persisted product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub prod_name: Option<String>,
    pub prod_price: Option<f64>,
    pub prod_desc: Option<String>,
}

impl Product {
    pub fn from_draft(id: i64, draft: ProductDraft) -> Self {
        Self {
            id,
            prod_name: draft.prod_name,
            prod_price: draft.prod_price,
            prod_desc: draft.prod_desc,
        }
    }

    /// Case-sensitive substring match on the product name
    ///
    /// Products without a name never match.
    pub fn name_contains(&self, fragment: &str) -> bool {
        self.prod_name
            .as_deref()
            .is_some_and(|name| name.contains(fragment))
    }
}
