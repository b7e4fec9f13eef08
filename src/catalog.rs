//! Product catalog: CRUD surface plus the kind-checked lookups the cart
//! engine consumes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Product, ProductKind};
use crate::{Error, Result};

/// Lookup capability consumed by the cart engine.
///
/// Lookups are kind-checked: a drink id pointing at a topping (or vice versa)
/// does not resolve. `find_toppings` returns every match it can; the caller
/// compares the returned id set against the requested one to detect missing
/// entries.
pub trait ProductSource {
    fn find_drink(&self, id: Uuid) -> Option<Product>;
    fn find_toppings(&self, ids: &HashSet<Uuid>) -> Vec<Product>;
}

impl<T: ProductSource + ?Sized> ProductSource for Arc<T> {
    fn find_drink(&self, id: Uuid) -> Option<Product> {
        (**self).find_drink(id)
    }

    fn find_toppings(&self, ids: &HashSet<Uuid>) -> Vec<Product> {
        (**self).find_toppings(ids)
    }
}

/// In-memory product store. Whole-product reads and writes behind a lock;
/// last writer wins.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, name: impl Into<String>, price: Decimal, kind: ProductKind) -> Product {
        let product = Product::new(name, price, kind);
        let mut products = self.products.write().expect("poisoned lock");
        products.insert(product.id, product.clone());
        product
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Product> {
        self.products.read().expect("poisoned lock").get(&id).cloned()
    }

    /// All products, oldest first.
    pub fn find_all(&self) -> Vec<Product> {
        let products = self.products.read().expect("poisoned lock");
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        all
    }

    /// Updates name and price; the kind of an existing product never changes.
    pub fn update(&self, id: Uuid, name: impl Into<String>, price: Decimal) -> Result<Product> {
        let mut products = self.products.write().expect("poisoned lock");
        let product = products.get_mut(&id).ok_or(Error::ProductNotFound)?;
        product.name = name.into();
        product.price = price;
        product.updated_at = chrono::Utc::now();
        Ok(product.clone())
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        let mut products = self.products.write().expect("poisoned lock");
        products.remove(&id).map(|_| ()).ok_or(Error::ProductNotFound)
    }
}

impl ProductSource for ProductCatalog {
    fn find_drink(&self, id: Uuid) -> Option<Product> {
        self.find_by_id(id).filter(Product::is_drink)
    }

    fn find_toppings(&self, ids: &HashSet<Uuid>) -> Vec<Product> {
        let products = self.products.read().expect("poisoned lock");
        ids.iter()
            .filter_map(|id| products.get(id))
            .filter(|p| p.is_topping())
            .cloned()
            .collect()
    }
}
