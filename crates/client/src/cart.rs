//! Cart reconciliation.
//!
//! Pure state: no I/O lives here. A line item is identified by the composite
//! key (product id, size, color); adding an identity that is already present
//! increments the existing line instead of appending a duplicate. Totals are
//! derived on every read and never stored.
//!
//! Both the in-memory cart owned by the [`crate::Storefront`] and the
//! locally persisted cart behind the fallback provider go through the
//! operations in this module, so the merge rules cannot drift between the
//! two paths.

use serde::{Deserialize, Serialize};

use vexa_core::{Price, ProductId};

use crate::types::Product;

/// The slice of product data embedded in a cart line, captured when the item
/// is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product ID.
    pub id: ProductId,
    /// Name at add time.
    pub name: String,
    /// Unit price at add time.
    pub price: Price,
    /// Primary image at add time.
    pub image: Option<String>,
}

impl ProductSnapshot {
    /// Snapshot the fields a cart line needs from a resolved product.
    #[must_use]
    pub fn of(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.primary_image().map(str::to_owned),
        }
    }
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Embedded product snapshot.
    pub product: ProductSnapshot,
    /// Quantity, always at least 1.
    pub quantity: u32,
    /// Selected size.
    pub size: String,
    /// Selected color.
    pub color: String,
}

impl CartLine {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price.times(self.quantity)
    }

    fn has_identity(&self, product_id: &ProductId, size: &str, color: &str) -> bool {
        self.product.id == *product_id && self.size == size && self.color == color
    }
}

/// An ordered collection of cart lines with merge-by-identity semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a cart from previously persisted or fetched lines.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Add `quantity` of a product in the given size and color.
    ///
    /// If a line with the same (product id, size, color) identity already
    /// exists its quantity is incremented; otherwise a new line is appended
    /// with the provided snapshot.
    pub fn add(&mut self, product: ProductSnapshot, quantity: u32, size: &str, color: &str) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.has_identity(&product.id, size, color))
        {
            line.quantity += quantity;
            return;
        }

        self.lines.push(CartLine {
            product,
            quantity,
            size: size.to_owned(),
            color: color.to_owned(),
        });
    }

    /// Overwrite the quantity of every line for `product_id`.
    ///
    /// Matches on product id alone - size and color do not participate here,
    /// mirroring the update endpoint's contract. A quantity of zero removes
    /// the matching lines. No-op if nothing matches.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }

        for line in &mut self.lines {
            if line.product.id == *product_id {
                line.quantity = quantity;
            }
        }
    }

    /// Delete every line for `product_id`. No-op if nothing matches.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| line.product.id != *product_id);
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line subtotals, recomputed on every call.
    #[must_use]
    pub fn items_total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total quantity across all lines, recomputed on every call.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Consume the cart and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot(id: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(price),
            image: None,
        }
    }

    #[test]
    fn test_add_merges_same_identity() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 2, "M", "Black");
        cart.add(snapshot("1", 599), 1, "M", "Black");

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn test_add_distinguishes_size_and_color() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 1, "M", "Black");
        cart.add(snapshot("1", 599), 1, "L", "Black");
        cart.add(snapshot("1", 599), 1, "M", "White");

        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_items_total_recomputed() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 2, "M", "Black");
        cart.add(snapshot("2", 899), 1, "L", "Navy");
        assert_eq!(cart.items_total(), Price::new(599 * 2 + 899));

        cart.set_quantity(&ProductId::new("1"), 1);
        assert_eq!(cart.items_total(), Price::new(599 + 899));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 2, "M", "Black");
        cart.set_quantity(&ProductId::new("1"), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_matches_by_id_only() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 1, "M", "Black");
        cart.add(snapshot("1", 599), 5, "L", "White");

        cart.set_quantity(&ProductId::new("1"), 2);
        assert!(cart.lines().iter().all(|line| line.quantity == 2));
    }

    #[test]
    fn test_set_quantity_no_match_is_noop() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 1, "M", "Black");
        cart.set_quantity(&ProductId::new("999"), 4);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_remove_deletes_all_matching_lines() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 1, "M", "Black");
        cart.add(snapshot("1", 599), 1, "L", "Black");
        cart.add(snapshot("2", 899), 1, "M", "Navy");

        cart.remove(&ProductId::new("1"));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].product.id, ProductId::new("2"));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(snapshot("1", 599), 3, "M", "Black");
        cart.clear();

        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.items_total(), Price::ZERO);
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let mut cart = Cart::new();
        cart.add(snapshot("2", 899), 1, "L", "Navy");
        cart.add(snapshot("1", 599), 2, "M", "Black");

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
