//! Cart pricing and mutation engine.
//!
//! Each operation loads a cart aggregate, resolves products through the
//! catalog, mutates the cart in memory (repricing it), and writes it back as
//! a whole unit. Every failure aborts before any store write.

use std::collections::HashSet;

use uuid::Uuid;

use crate::catalog::ProductSource;
use crate::domain::{Cart, CartItem, Product};
use crate::store::CartStore;
use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct CartService<C, S> {
    catalog: C,
    store: S,
}

impl<C: ProductSource, S: CartStore> CartService<C, S> {
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Cart> {
        self.store.load(id)
    }

    /// Creates a cart holding exactly one item.
    pub fn create(&self, drink_id: Uuid, topping_ids: &HashSet<Uuid>) -> Result<Cart> {
        let drink = self.catalog.find_drink(drink_id).ok_or(Error::DrinkNotFound)?;
        let toppings = self.resolve_toppings(topping_ids)?;

        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink, toppings));
        Ok(self.store.save(cart))
    }

    /// Appends a new item to the cart's item sequence.
    pub fn add_item(
        &self,
        cart_id: Uuid,
        drink_id: Uuid,
        topping_ids: &HashSet<Uuid>,
    ) -> Result<Cart> {
        let mut cart = self.store.load(cart_id).ok_or(Error::CartNotFound)?;
        let drink = self.catalog.find_drink(drink_id).ok_or(Error::DrinkNotFound)?;
        let toppings = self.resolve_toppings(topping_ids)?;

        cart.add_item(CartItem::new(drink, toppings));
        Ok(self.store.save(cart))
    }

    /// Replaces an item's topping set wholesale; its drink stays as is.
    pub fn edit_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        topping_ids: &HashSet<Uuid>,
    ) -> Result<Cart> {
        let mut cart = self.store.load(cart_id).ok_or(Error::CartNotFound)?;
        // The item must exist before toppings are resolved, so a request
        // naming both a bad item and a bad topping reports the item.
        if cart.item(item_id).is_none() {
            return Err(Error::CartItemNotFound);
        }
        let toppings = self.resolve_toppings(topping_ids)?;

        cart.replace_toppings(item_id, toppings)?;
        Ok(self.store.save(cart))
    }

    pub fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<Cart> {
        let mut cart = self.store.load(cart_id).ok_or(Error::CartNotFound)?;
        cart.remove_item(item_id)?;
        Ok(self.store.save(cart))
    }

    /// All-or-nothing topping resolution: if any requested id is missing (or
    /// is not a topping), the whole operation fails.
    fn resolve_toppings(&self, topping_ids: &HashSet<Uuid>) -> Result<Vec<Product>> {
        let toppings = self.catalog.find_toppings(topping_ids);
        let found: HashSet<Uuid> = toppings.iter().map(|t| t.id).collect();
        if !topping_ids.is_subset(&found) {
            return Err(Error::ToppingNotFound);
        }
        Ok(toppings)
    }
}
