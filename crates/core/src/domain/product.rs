use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog-unique product label. Recommendation dedup is keyed on this value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductName(pub String);

impl ProductName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProductName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ProductName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: ProductName,
    pub nutriscore: String,
    pub category: String,
    pub brand: String,
    pub unit_price: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Purchased,
    NotPurchased,
}

/// A catalog product flagged with whether one customer has ever ordered it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedProduct {
    pub product: Product,
    pub status: PurchaseStatus,
}

impl TaggedProduct {
    pub fn purchased(product: Product) -> Self {
        Self { product, status: PurchaseStatus::Purchased }
    }

    pub fn not_purchased(product: Product) -> Self {
        Self { product, status: PurchaseStatus::NotPurchased }
    }

    pub fn is_purchased(&self) -> bool {
        self.status == PurchaseStatus::Purchased
    }
}
