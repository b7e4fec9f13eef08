//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminates the two product families sold by the store.
///
/// A cart item references exactly one `Drink` product and any number of
/// `Topping` products; the catalog lookups enforce the kind, not the cart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductKind {
    Drink,
    Topping,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unit price. Non-negative, validated at the API boundary.
    pub price: Decimal,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal, kind: ProductKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_drink(&self) -> bool {
        self.kind == ProductKind::Drink
    }

    pub fn is_topping(&self) -> bool {
        self.kind == ProductKind::Topping
    }
}
