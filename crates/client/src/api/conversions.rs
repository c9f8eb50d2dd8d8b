//! Conversion from wire payloads to validated domain types.
//!
//! This is the only place API payloads are interpreted. Shape or invariant
//! violations fail fast with [`ApiError::Invalid`] instead of letting
//! half-parsed data flow through the client.

use vexa_core::{Email, OrderId, PaymentId, Price, ProductId, UserId};

use crate::api::ApiError;
use crate::api::types::{
    CartItemPayload, OrderItemPayload, OrderPayload, PaymentOrderPayload, ProductPayload,
    ShippingAddressPayload, UserPayload,
};
use crate::cart::{CartLine, ProductSnapshot};
use crate::checkout::ShippingAddress;
use crate::types::{Order, OrderItem, PaymentOrder, Product, User};

/// Normalize the historical availability shapes into one predicate.
///
/// A zero stock count wins over everything; an explicit `inStock: false`
/// is honored; absence of both means available.
pub const fn normalize_in_stock(stock: Option<i64>, in_stock: Option<bool>) -> bool {
    match (stock, in_stock) {
        (Some(0), _) | (_, Some(false)) => false,
        _ => true,
    }
}

pub fn convert_user(payload: UserPayload) -> Result<User, ApiError> {
    let email = Email::parse(&payload.email)
        .map_err(|err| ApiError::Invalid(format!("user {}: {err}", payload.id)))?;
    let role = match payload.role.as_str() {
        "admin" => vexa_core::Role::Admin,
        "user" => vexa_core::Role::User,
        other => return Err(ApiError::Invalid(format!("unknown role: {other}"))),
    };

    Ok(User {
        id: UserId::new(payload.id),
        name: payload.name,
        email,
        role,
    })
}

pub fn convert_product(payload: ProductPayload) -> Result<Product, ApiError> {
    if payload.price < 0 {
        return Err(ApiError::Invalid(format!(
            "product {} has negative price {}",
            payload.id, payload.price
        )));
    }

    let in_stock = normalize_in_stock(payload.stock, payload.in_stock);

    Ok(Product {
        id: ProductId::new(payload.id),
        name: payload.name,
        price: Price::new(payload.price),
        images: payload.images,
        category: payload.category.unwrap_or_default(),
        description: payload.description.unwrap_or_default(),
        sizes: payload.sizes,
        colors: payload.colors,
        rating: payload.rating.unwrap_or(0.0).clamp(0.0, 5.0),
        num_reviews: payload.num_reviews.unwrap_or(0),
        stock: payload.stock,
        in_stock,
    })
}

pub fn convert_cart_item(payload: CartItemPayload) -> Result<CartLine, ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::Invalid(format!(
            "cart item for product {} has quantity {}",
            payload.product.id, payload.quantity
        )));
    }
    if payload.product.price < 0 {
        return Err(ApiError::Invalid(format!(
            "cart item for product {} has negative price",
            payload.product.id
        )));
    }

    Ok(CartLine {
        product: ProductSnapshot {
            id: ProductId::new(payload.product.id),
            name: payload.product.name,
            price: Price::new(payload.product.price),
            image: payload.product.images.into_iter().next(),
        },
        quantity: payload.quantity,
        size: payload.size,
        color: payload.color,
    })
}

pub fn convert_order(payload: OrderPayload) -> Result<Order, ApiError> {
    let status = serde_json::from_value(serde_json::Value::String(payload.status.clone()))
        .map_err(|_| ApiError::Invalid(format!("unknown order status: {}", payload.status)))?;
    let payment_method =
        serde_json::from_value(serde_json::Value::String(payload.payment_method.clone()))
            .map_err(|_| {
                ApiError::Invalid(format!("unknown payment method: {}", payload.payment_method))
            })?;

    Ok(Order {
        id: OrderId::new(payload.id),
        items: payload
            .items
            .into_iter()
            .map(convert_order_item)
            .collect::<Result<_, _>>()?,
        shipping_address: convert_shipping_address(payload.shipping_address),
        payment_method,
        items_price: Price::new(payload.items_price),
        shipping_price: Price::new(payload.shipping_price),
        tax_price: Price::new(payload.tax_price),
        total_price: Price::new(payload.total_price),
        status,
        created_at: payload.created_at,
    })
}

fn convert_order_item(payload: OrderItemPayload) -> Result<OrderItem, ApiError> {
    if payload.price < 0 {
        return Err(ApiError::Invalid(format!(
            "order item {} has negative price",
            payload.product
        )));
    }

    Ok(OrderItem {
        product_id: ProductId::new(payload.product),
        name: payload.name,
        price: Price::new(payload.price),
        quantity: payload.quantity,
        size: payload.size,
        color: payload.color,
        image: payload.image,
    })
}

fn convert_shipping_address(payload: ShippingAddressPayload) -> ShippingAddress {
    ShippingAddress {
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        pincode: payload.pincode,
    }
}

pub fn convert_payment_order(payload: PaymentOrderPayload) -> Result<PaymentOrder, ApiError> {
    if payload.amount < 0 {
        return Err(ApiError::Invalid(
            "payment order has negative amount".to_string(),
        ));
    }

    Ok(PaymentOrder {
        id: PaymentId::new(payload.id),
        amount: Price::new(payload.amount),
    })
}
