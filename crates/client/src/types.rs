//! Domain types for the storefront client.
//!
//! These are the validated, ergonomic shapes the rest of the crate works
//! with, separate from the raw wire payloads in [`crate::api::types`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vexa_core::{Email, OrderId, OrderStatus, PaymentMethod, Price, ProductId, Role, UserId};

use crate::checkout::ShippingAddress;

// =============================================================================
// Catalog Types
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URLs; the first one is the primary image.
    pub images: Vec<String>,
    /// Category label.
    pub category: String,
    /// Plain text description.
    pub description: String,
    /// Available sizes, in catalog order.
    pub sizes: Vec<String>,
    /// Available colors, in catalog order.
    pub colors: Vec<String>,
    /// Average rating (0.0 - 5.0).
    pub rating: f64,
    /// Number of reviews behind the rating.
    pub num_reviews: i64,
    /// Units on hand, when the API reports a count.
    pub stock: Option<i64>,
    /// Normalized availability, computed once at ingestion.
    pub in_stock: bool,
}

impl Product {
    /// The primary image, if the product has any images at all.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Sort orders accepted by the product list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    /// Price, low to high (`price`).
    PriceAsc,
    /// Price, high to low (`-price`).
    PriceDesc,
    /// Rating, high to low (`-rating`).
    RatingDesc,
    /// Newest first (`-createdAt`).
    Newest,
}

impl ProductSort {
    /// The value sent on the wire for the `sort` query parameter.
    #[must_use]
    pub const fn as_query_value(self) -> &'static str {
        match self {
            Self::PriceAsc => "price",
            Self::PriceDesc => "-price",
            Self::RatingDesc => "-rating",
            Self::Newest => "-createdAt",
        }
    }
}

/// Filter, sort, and pagination parameters for the product list.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Substring match against the product name.
    pub keyword: Option<String>,
    /// Exact (case-insensitive) category match.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    /// Sort order.
    pub sort: Option<ProductSort>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Default page size when the caller does not specify one.
    pub const DEFAULT_LIMIT: u32 = 12;

    /// Whether this query is a keyword search. Search results are not
    /// cached.
    #[must_use]
    pub fn is_search(&self) -> bool {
        self.keyword.is_some()
    }

    /// Encode the query as a URL query string, omitting unset parameters.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());

        if let Some(keyword) = &self.keyword {
            serializer.append_pair("keyword", keyword);
        }
        if let Some(category) = &self.category {
            serializer.append_pair("category", category);
        }
        if let Some(min) = self.min_price {
            serializer.append_pair("minPrice", &min.amount().to_string());
        }
        if let Some(max) = self.max_price {
            serializer.append_pair("maxPrice", &max.amount().to_string());
        }
        if let Some(sort) = self.sort {
            serializer.append_pair("sort", sort.as_query_value());
        }
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }

        serializer.finish()
    }
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination block returned alongside list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pagination {
    /// Current 1-based page.
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
    /// Number of items on this page.
    pub count: u32,
    /// Total number of items across all pages.
    pub total: u32,
}

/// A page of items with its pagination block.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Pagination info.
    pub pagination: Pagination,
}

// =============================================================================
// Identity Types
// =============================================================================

/// An authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Account role.
    pub role: Role,
}

// =============================================================================
// Order Types
// =============================================================================

/// A line on a placed order, snapshotted from the cart at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Unit price at order time.
    pub price: Price,
    /// Quantity ordered.
    pub quantity: u32,
    /// Selected size.
    pub size: String,
    /// Selected color.
    pub color: String,
    /// Primary product image at order time.
    pub image: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Ordered items.
    pub items: Vec<OrderItem>,
    /// Delivery address.
    pub shipping_address: ShippingAddress,
    /// Payment method chosen at checkout.
    pub payment_method: PaymentMethod,
    /// Sum of line subtotals.
    pub items_price: Price,
    /// Shipping fee.
    pub shipping_price: Price,
    /// Tax amount.
    pub tax_price: Price,
    /// Grand total.
    pub total_price: Price,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Types
// =============================================================================

/// A payment order created with the gateway before verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    /// Gateway-issued payment id.
    pub id: vexa_core::PaymentId,
    /// Amount to collect.
    pub amount: Price,
}

/// Outcome of payment verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// The payment that was verified.
    pub payment_id: vexa_core::PaymentId,
    /// Whether the gateway accepted the payment.
    pub verified: bool,
}

// =============================================================================
// Admin Types
// =============================================================================

/// Aggregate store statistics for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Registered accounts.
    pub total_users: u64,
    /// Products in the catalog.
    pub total_products: u64,
    /// Orders placed.
    pub total_orders: u64,
    /// Revenue across all orders.
    pub total_revenue: Price,
}

/// Everything the admin dashboard renders: aggregate stats plus the most
/// recent orders.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Aggregate statistics.
    pub stats: AdminStats,
    /// Most recent orders, newest first.
    pub recent_orders: Vec<Order>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_image() {
        let product = Product {
            id: ProductId::new("1"),
            name: "Tee".to_string(),
            price: Price::new(599),
            images: vec!["first.jpg".to_string(), "second.jpg".to_string()],
            category: "Men".to_string(),
            description: String::new(),
            sizes: vec![],
            colors: vec![],
            rating: 4.5,
            num_reviews: 0,
            stock: Some(10),
            in_stock: true,
        };
        assert_eq!(product.primary_image(), Some("first.jpg"));
    }

    #[test]
    fn test_query_string_empty() {
        assert_eq!(ProductQuery::default().to_query_string(), "");
    }

    #[test]
    fn test_query_string_full() {
        let query = ProductQuery {
            keyword: Some("polo shirt".to_string()),
            category: Some("Men".to_string()),
            min_price: Some(Price::new(100)),
            max_price: Some(Price::new(1000)),
            sort: Some(ProductSort::PriceDesc),
            page: Some(2),
            limit: Some(12),
        };
        assert_eq!(
            query.to_query_string(),
            "keyword=polo+shirt&category=Men&minPrice=100&maxPrice=1000&sort=-price&page=2&limit=12"
        );
    }

    #[test]
    fn test_sort_wire_values() {
        assert_eq!(ProductSort::PriceAsc.as_query_value(), "price");
        assert_eq!(ProductSort::Newest.as_query_value(), "-createdAt");
    }
}
