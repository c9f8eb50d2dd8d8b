//! Raw wire payloads for the REST API.
//!
//! Every response follows the `{ success, data?, message?, pagination? }`
//! envelope. The payload structs here mirror the JSON exactly; the validated
//! domain shapes live in [`crate::types`] and are produced by
//! [`crate::api::conversions`].

use serde::{Deserialize, Serialize};

// =============================================================================
// Response Envelope
// =============================================================================

/// The response envelope every endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the request was accepted.
    pub success: bool,
    /// The payload, present on success.
    pub data: Option<T>,
    /// Human-readable message, usually present on failure.
    pub message: Option<String>,
    /// Pagination block, present on list responses.
    pub pagination: Option<PaginationPayload>,
}

/// Pagination block on list responses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationPayload {
    pub page: u32,
    pub pages: u32,
    pub count: u32,
    pub total: u32,
}

/// Minimal body shape used to pull a message out of error responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

// =============================================================================
// Identity Payloads
// =============================================================================

/// A user as the API serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Login/register response payload: the user plus the issued token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub user: UserPayload,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UpdateDetailsRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

// =============================================================================
// Catalog Payloads
// =============================================================================

/// A product as the API serializes it.
///
/// Availability arrives in one of several historical shapes: a `stock`
/// count, an `inStock` flag, both, or neither. Normalization happens once in
/// the conversion layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub num_reviews: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

// =============================================================================
// Cart Payloads
// =============================================================================

/// The product snapshot embedded in a cart item.
#[derive(Debug, Clone, Deserialize)]
pub struct CartProductPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A cart line as the API serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemPayload {
    pub product: CartProductPayload,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a str,
    pub quantity: u32,
    pub size: &'a str,
    pub color: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

// =============================================================================
// Order Payloads
// =============================================================================

/// An order line on the wire, both for creation requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemPayload {
    /// Product id.
    pub product: String,
    pub name: String,
    pub price: i64,
    pub quantity: u32,
    pub size: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Shipping address on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressPayload {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
}

/// An order as the API serializes it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    #[serde(rename = "_id")]
    pub id: String,
    pub items: Vec<OrderItemPayload>,
    pub shipping_address: ShippingAddressPayload,
    pub payment_method: String,
    pub items_price: i64,
    pub shipping_price: i64,
    pub tax_price: i64,
    pub total_price: i64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Order creation body: items, address, payment method, and the price
/// breakdown computed client-side from the cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemPayload>,
    pub shipping_address: ShippingAddressPayload,
    pub payment_method: String,
    pub items_price: i64,
    pub shipping_price: i64,
    pub tax_price: i64,
    pub total_price: i64,
}

// =============================================================================
// Payment Payloads
// =============================================================================

/// Payment order returned by `POST /payment/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrderPayload {
    pub id: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest<'a> {
    pub payment_id: &'a str,
}

// =============================================================================
// Admin Payloads
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AdminUpdateUserRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
}
