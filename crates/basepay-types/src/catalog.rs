//! Storefront catalog: businesses that accept payment and what they sell.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Address;

/// A product with a price in whole tokens (e.g. `4.50` USDC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl Product {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }
}

/// A listed business and the address that receives its payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub category: String,
    pub address: Address,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Business {
    /// Find a product by exact name.
    #[must_use]
    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }
}

/// Dummy business for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Business {
    pub fn dummy(name: &str, address: Address) -> Self {
        Self {
            name: name.to_string(),
            category: "Cafe".to_string(),
            address,
            products: vec![Product::new("Espresso", "Single shot", Decimal::new(3, 0))],
        }
    }
}
