//! Coffee Store API
//!
//! E-commerce backend for a coffee shop: a catalog of products (drinks and
//! toppings) and shopping carts of line items, each item one drink plus a set
//! of toppings.
//!
//! ## Features
//! - Product catalog management (drinks and toppings)
//! - Cart creation and item add/edit/remove
//! - Promotion pricing: 25% off carts of 12.00 or more, or the cheapest item
//!   free on carts of 3+ items, whichever discounts more

use thiserror::Error;

pub mod catalog;
pub mod domain;
pub mod service;
pub mod store;

// =============================================================================
// Error Types
// =============================================================================

/// Errors surfaced by the catalog and cart engine.
///
/// Every variant is a "not found" class failure: non-retryable, correctable
/// by the caller, and raised before any mutation or store write happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Drink not found")]
    DrinkNotFound,

    #[error("Topping not found")]
    ToppingNotFound,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("Product not found")]
    ProductNotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
