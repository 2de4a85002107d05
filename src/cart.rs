//! Pre-checkout cart with the pricing and merge rules shared by the
//! checkout path.
//!
//! A cart is keyed by the pair `(menu_id, variant)`: adding the same
//! pair twice merges into one line by summing quantities. `remove` and
//! `set_quantity` are deliberately coarser and match every line with
//! the given `menu_id` regardless of variant. That asymmetry is part of
//! the contract, not an accident.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

/// One selected item. Name, price and variant modifier are captured at
/// add-time; `menu_id` is a reference, not ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub menu_id: i32,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub variant: Option<String>,
    pub variant_price: Option<i64>,
}

impl CartLine {
    /// Unit price including the variant modifier.
    pub fn unit_price(&self) -> i64 {
        self.price + self.variant_price.unwrap_or(0)
    }

    pub fn line_total(&self) -> i64 {
        self.unit_price() * self.quantity as i64
    }
}

/// Client-local persistence for the cart. Every mutation writes through
/// immediately; there is no server-side durability guarantee.
pub trait CartStore {
    fn load(&self) -> Option<Vec<CartLine>>;
    fn save(&self, lines: &[CartLine]);
    fn clear(&self);
}

/// Detached carts (e.g. the server-side checkout fold) use the unit
/// store, which persists nothing.
impl CartStore for () {
    fn load(&self) -> Option<Vec<CartLine>> {
        None
    }

    fn save(&self, _lines: &[CartLine]) {}

    fn clear(&self) {}
}

/// Ephemeral in-memory store, the moral equivalent of browser-local
/// storage.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    saved: RefCell<Option<Vec<CartLine>>>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Option<Vec<CartLine>> {
        self.saved.borrow().clone()
    }

    fn save(&self, lines: &[CartLine]) {
        *self.saved.borrow_mut() = Some(lines.to_vec());
    }

    fn clear(&self) {
        *self.saved.borrow_mut() = None;
    }
}

#[derive(Debug)]
pub struct Cart<S: CartStore> {
    lines: Vec<CartLine>,
    store: S,
}

impl Cart<()> {
    /// A cart with no backing store.
    pub fn detached() -> Self {
        Cart {
            lines: Vec::new(),
            store: (),
        }
    }
}

impl<S: CartStore> Cart<S> {
    /// Load existing state from the store, defaulting to empty.
    pub fn hydrate(store: S) -> Self {
        let lines = store.load().unwrap_or_default();
        Cart { lines, store }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Merge on `(menu_id, variant)`: an existing line gets its
    /// quantity incremented, otherwise the line is appended.
    pub fn add(&mut self, line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|l| l.menu_id == line.menu_id && l.variant == line.variant)
        {
            Some(existing) => existing.quantity += line.quantity,
            None => self.lines.push(line),
        }
        self.store.save(&self.lines);
    }

    /// Removes every line with this `menu_id`, regardless of variant.
    pub fn remove(&mut self, menu_id: i32) {
        self.lines.retain(|l| l.menu_id != menu_id);
        self.store.save(&self.lines);
    }

    /// Sets the quantity on every line with this `menu_id`. A quantity
    /// of zero or less behaves as `remove`.
    pub fn set_quantity(&mut self, menu_id: i32, quantity: i32) {
        if quantity <= 0 {
            self.remove(menu_id);
            return;
        }
        for line in self.lines.iter_mut().filter(|l| l.menu_id == menu_id) {
            line.quantity = quantity;
        }
        self.store.save(&self.lines);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.store.clear();
    }

    /// `Σ (price + variant_price) * quantity`. Recomputed on demand,
    /// never cached.
    pub fn total(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(menu_id: i32, price: i64, quantity: i32, variant: Option<(&str, i64)>) -> CartLine {
        CartLine {
            menu_id,
            name: format!("Item {menu_id}"),
            price,
            quantity,
            variant: variant.map(|(name, _)| name.to_string()),
            variant_price: variant.map(|(_, price)| price),
        }
    }

    #[test]
    fn add_merges_on_menu_id_and_variant() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 2, Some(("Spicy", 2000))));
        cart.add(line(1, 25000, 1, Some(("Spicy", 2000))));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn add_keeps_distinct_variants_separate() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 1, Some(("Spicy", 2000))));
        cart.add(line(1, 25000, 1, None));
        cart.add(line(1, 25000, 1, Some(("Mild", 0))));

        assert_eq!(cart.lines().len(), 3);
    }

    #[test]
    fn remove_matches_all_variants_of_a_menu_id() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 1, Some(("Spicy", 2000))));
        cart.add(line(1, 25000, 1, None));
        cart.add(line(2, 30000, 1, None));

        cart.remove(1);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].menu_id, 2);
    }

    #[test]
    fn set_quantity_matches_all_variants_of_a_menu_id() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 2, Some(("Spicy", 2000))));
        cart.add(line(1, 25000, 5, None));

        cart.set_quantity(1, 4);

        assert!(cart.lines().iter().all(|l| l.quantity == 4));
    }

    #[test]
    fn set_quantity_zero_or_negative_removes() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 2, None));
        cart.set_quantity(1, 0);
        assert!(cart.is_empty());

        cart.add(line(1, 25000, 2, None));
        cart.set_quantity(1, -1);
        assert!(cart.is_empty());
    }

    #[test]
    fn total_includes_variant_modifier() {
        let mut cart = Cart::detached();
        cart.add(line(1, 25000, 2, Some(("Spicy", 2000))));

        assert_eq!(cart.total(), 54000);
    }

    #[test]
    fn total_tracks_mutations() {
        let mut cart = Cart::detached();
        cart.add(line(1, 10000, 1, None));
        cart.add(line(2, 5000, 3, Some(("Large", 1000))));
        assert_eq!(cart.total(), 10000 + 3 * 6000);

        cart.set_quantity(2, 1);
        assert_eq!(cart.total(), 10000 + 6000);

        cart.remove(1);
        assert_eq!(cart.total(), 6000);

        cart.clear();
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn mutations_write_through_to_the_store() {
        let store = MemoryCartStore::new();
        let mut cart = Cart::hydrate(store);
        cart.add(line(1, 25000, 2, None));

        let rehydrated = Cart::hydrate(cart.store);
        assert_eq!(rehydrated.lines().len(), 1);
        assert_eq!(rehydrated.total(), 50000);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = MemoryCartStore::new();
        let mut cart = Cart::hydrate(store);
        cart.add(line(1, 25000, 2, None));
        cart.clear();

        let rehydrated = Cart::hydrate(cart.store);
        assert!(rehydrated.is_empty());
    }

    #[test]
    fn hydrate_defaults_to_empty() {
        let cart = Cart::hydrate(MemoryCartStore::new());
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }
}
