//! Cart Aggregate
//!
//! A cart is an ordered sequence of items, each one drink plus its toppings.
//! `discount` and `amount` are derived state: every mutation recomputes them
//! from the full item list, never patches them incrementally.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;
use crate::{Error, Result};

/// Carts totalling at least this gross amount get a percentage discount.
fn amount_promotion_threshold() -> Decimal {
    Decimal::new(1200, 2)
}

/// Percentage applied by the promotion by amount.
fn amount_promotion_rate() -> Decimal {
    Decimal::new(25, 2)
}

/// Minimum item count for the promotion by quantity (cheapest item free).
const QUANTITY_PROMOTION_MIN_ITEMS: usize = 3;

/// Rounds a final monetary value to 2 decimal places, half-up.
///
/// Applied only to the final `discount` and `amount`, never to intermediate
/// sums.
fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    id: Uuid,
    drink: Product,
    toppings: Vec<Product>,
}

impl CartItem {
    /// Builds a fresh line item. `toppings` are expected unique by id; the
    /// catalog resolution guarantees that.
    pub fn new(drink: Product, toppings: Vec<Product>) -> Self {
        Self {
            id: Uuid::new_v4(),
            drink,
            toppings,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn drink(&self) -> &Product {
        &self.drink
    }

    pub fn toppings(&self) -> &[Product] {
        &self.toppings
    }

    /// Drink price plus this item's own toppings.
    pub fn line_total(&self) -> Decimal {
        self.drink.price + self.toppings.iter().map(|t| t.price).sum::<Decimal>()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    id: Uuid,
    items: Vec<CartItem>,
    discount: Decimal,
    amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            items: vec![],
            discount: round_money(Decimal::ZERO),
            amount: round_money(Decimal::ZERO),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, item_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Gross amount before discount: all drinks plus all toppings, flat.
    pub fn gross_amount(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Appends an item at the end of the sequence and reprices the cart.
    pub fn add_item(&mut self, item: CartItem) {
        self.items.push(item);
        self.recalculate();
    }

    /// Replaces an item's topping set wholesale; the drink is unchanged.
    pub fn replace_toppings(&mut self, item_id: Uuid, toppings: Vec<Product>) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(Error::CartItemNotFound)?;
        item.toppings = toppings;
        self.recalculate();
        Ok(())
    }

    /// Removes the item with the given id. Removing the last item is allowed
    /// and leaves an empty cart with zero amount and discount.
    pub fn remove_item(&mut self, item_id: Uuid) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() == before {
            return Err(Error::CartItemNotFound);
        }
        self.recalculate();
        Ok(())
    }

    /// Recomputes `discount` and `amount` from the full item list.
    ///
    /// Both promotions are evaluated independently every time and the larger
    /// discount wins. Rounding happens here and only here.
    fn recalculate(&mut self) {
        let gross = self.gross_amount();
        let discount = self.discount_by_amount(gross).max(self.discount_by_quantity());
        self.discount = round_money(discount);
        self.amount = round_money(gross - self.discount);
        self.updated_at = Utc::now();
    }

    /// 25% off once the gross amount reaches 12.00.
    fn discount_by_amount(&self, gross: Decimal) -> Decimal {
        if gross >= amount_promotion_threshold() {
            gross * amount_promotion_rate()
        } else {
            Decimal::ZERO
        }
    }

    /// Cheapest single item (drink + its own toppings) free on 3+ items.
    fn discount_by_quantity(&self) -> Decimal {
        if self.items.len() >= QUANTITY_PROMOTION_MIN_ITEMS {
            self.items
                .iter()
                .map(CartItem::line_total)
                .min()
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductKind;

    fn drink(price: i64) -> Product {
        Product::new("drink", Decimal::from(price), ProductKind::Drink)
    }

    fn topping(price: i64) -> Product {
        Product::new("topping", Decimal::from(price), ProductKind::Topping)
    }

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_single_cheap_item_gets_no_discount() {
        // drink 4 + 3 toppings of 2 = 10 < 12, one item < 3
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink(4), vec![topping(2), topping(2), topping(2)]));

        assert_eq!(cart.discount(), money(0));
        assert_eq!(cart.amount(), money(1000));
    }

    #[test]
    fn test_amount_promotion_at_threshold() {
        // drink 10 + topping 2 = 12 -> 25% = 3.00
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink(10), vec![topping(2)]));

        assert_eq!(cart.discount(), money(300));
        assert_eq!(cart.amount(), money(900));
    }

    #[test]
    fn test_quantity_promotion_makes_cheapest_item_free() {
        // 3 items of (2 + 1) = 9 gross; cheapest item 3 free
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(CartItem::new(drink(2), vec![topping(1)]));
        }

        assert_eq!(cart.discount(), money(300));
        assert_eq!(cart.amount(), money(600));
    }

    #[test]
    fn test_larger_discount_wins_when_both_apply() {
        // 3 items of (12 + 2) = 42 gross; by amount 10.50, by quantity 14.00
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(CartItem::new(drink(12), vec![topping(2)]));
        }

        assert_eq!(cart.discount(), money(1400));
        assert_eq!(cart.amount(), money(2800));
    }

    #[test]
    fn test_amount_promotion_beats_quantity_promotion() {
        // 3 items of (12 + 1) plus one (2 + 1) = 42 gross; 25% = 10.50 > 3.00
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(CartItem::new(drink(12), vec![topping(1)]));
        }
        cart.add_item(CartItem::new(drink(2), vec![topping(1)]));

        assert_eq!(cart.discount(), money(1050));
        assert_eq!(cart.amount(), money(3150));
    }

    #[test]
    fn test_removing_last_item_leaves_zeroed_cart() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink(10), vec![topping(2)]));
        let item_id = cart.items()[0].id();

        cart.remove_item(item_id).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.discount(), money(0));
        assert_eq!(cart.amount(), money(0));
    }

    #[test]
    fn test_remove_unknown_item_fails() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink(2), vec![]));

        assert_eq!(cart.remove_item(Uuid::new_v4()), Err(Error::CartItemNotFound));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_replace_toppings_keeps_drink_and_reprices() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(drink(10), vec![topping(1)]));
        let item_id = cart.items()[0].id();
        let drink_id = cart.items()[0].drink().id;

        cart.replace_toppings(item_id, vec![topping(2)]).unwrap();

        assert_eq!(cart.items()[0].drink().id, drink_id);
        assert_eq!(cart.gross_amount(), Decimal::from(12));
        assert_eq!(cart.discount(), money(300));
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart.add_item(CartItem::new(drink(12), vec![topping(2)]));
        }
        let (discount, amount) = (cart.discount(), cart.amount());

        cart.recalculate();

        assert_eq!(cart.discount(), discount);
        assert_eq!(cart.amount(), amount);
    }

    #[test]
    fn test_gross_amount_never_decreases_on_append() {
        let mut cart = Cart::new();
        let mut previous = cart.gross_amount();
        for price in [0, 1, 5, 12] {
            cart.add_item(CartItem::new(drink(price), vec![]));
            assert!(cart.gross_amount() >= previous);
            previous = cart.gross_amount();
        }
    }

    #[test]
    fn test_discount_never_exceeds_gross() {
        let mut cart = Cart::new();
        for _ in 0..4 {
            cart.add_item(CartItem::new(drink(3), vec![topping(1)]));
        }

        assert!(cart.discount() >= Decimal::ZERO);
        assert!(cart.discount() <= cart.gross_amount());
        assert_eq!(cart.amount(), round_money(cart.gross_amount() - cart.discount()));
    }

    #[test]
    fn test_rounding_applies_only_to_final_values() {
        // gross 12.10 -> 25% = 3.025, rounded half-up to 3.03; amount 9.07
        let mut cart = Cart::new();
        cart.add_item(CartItem::new(
            Product::new("drink", money(1210), ProductKind::Drink),
            vec![],
        ));

        assert_eq!(cart.discount(), money(303));
        assert_eq!(cart.amount(), money(907));
    }
}
