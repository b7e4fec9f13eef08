//! Domain aggregates for the coffee store.

pub mod cart;
pub mod product;

pub use cart::{Cart, CartItem};
pub use product::{Product, ProductKind};
