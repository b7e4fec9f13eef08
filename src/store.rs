//! Cart persistence boundary: whole-aggregate load and save.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::domain::Cart;

/// Whole-aggregate cart store. No partial updates; concurrent saves to the
/// same id resolve last-writer-wins.
pub trait CartStore {
    fn load(&self, id: Uuid) -> Option<Cart>;
    fn save(&self, cart: Cart) -> Cart;
}

impl<T: CartStore + ?Sized> CartStore for Arc<T> {
    fn load(&self, id: Uuid) -> Option<Cart> {
        (**self).load(id)
    }

    fn save(&self, cart: Cart) -> Cart {
        (**self).save(cart)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<Uuid, Cart>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.carts.read().expect("poisoned lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CartStore for InMemoryCartStore {
    fn load(&self, id: Uuid) -> Option<Cart> {
        self.carts.read().expect("poisoned lock").get(&id).cloned()
    }

    fn save(&self, cart: Cart) -> Cart {
        let mut carts = self.carts.write().expect("poisoned lock");
        carts.insert(cart.id(), cart.clone());
        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let store = InMemoryCartStore::new();
        let cart = Cart::new();
        let id = cart.id();

        store.save(cart);

        assert_eq!(store.len(), 1);
        assert_eq!(store.load(id).unwrap().id(), id);
    }

    #[test]
    fn test_load_missing_cart() {
        let store = InMemoryCartStore::new();
        assert!(store.load(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_save_overwrites_whole_aggregate() {
        let store = InMemoryCartStore::new();
        let cart = store.save(Cart::new());
        let mut changed = cart.clone();
        changed.add_item(crate::domain::CartItem::new(
            crate::domain::Product::new(
                "Latte",
                rust_decimal::Decimal::from(4),
                crate::domain::ProductKind::Drink,
            ),
            vec![],
        ));

        store.save(changed);

        assert_eq!(store.len(), 1);
        assert_eq!(store.load(cart.id()).unwrap().item_count(), 1);
    }
}
