//! Order draft pricing and checkout validation.
//!
//! The draft is always derived from the current cart state at the moment of
//! checkout; nothing here is cached between mutations.

use serde::{Deserialize, Serialize};

use vexa_core::Price;

use crate::cart::Cart;
use crate::error::{ClientError, Result};

/// Orders above this items total ship for free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::new(999);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Price = Price::new(99);

/// Tax rate applied to the items total, in percent.
pub const TAX_RATE_PERCENT: u32 = 18;

/// The computed checkout summary derived from the cart before an order is
/// created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDraft {
    /// Sum of line subtotals.
    pub items_price: Price,
    /// Shipping fee: zero above the free-shipping threshold, flat otherwise.
    pub shipping_price: Price,
    /// Tax on the items total, rounded to the nearest unit.
    pub tax_price: Price,
    /// Grand total.
    pub total_price: Price,
}

impl OrderDraft {
    /// Derive a draft from the current cart state.
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let items_price = cart.items_total();
        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            FLAT_SHIPPING_FEE
        };
        let tax_price = items_price.percent(TAX_RATE_PERCENT);

        Self {
            items_price,
            shipping_price,
            tax_price,
            total_price: items_price + shipping_price + tax_price,
        }
    }
}

/// Delivery address collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name. Required.
    pub full_name: String,
    /// Contact phone number. Required.
    pub phone: String,
    /// Street address. Required.
    pub address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub pincode: String,
}

impl ShippingAddress {
    /// Check that the required fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError::Validation`] naming the problem when a
    /// required field is empty. Nothing is persisted before this passes.
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty()
            || self.phone.trim().is_empty()
            || self.address.trim().is_empty()
        {
            return Err(ClientError::validation(
                "Please fill in all required fields.",
            ));
        }
        Ok(())
    }
}
