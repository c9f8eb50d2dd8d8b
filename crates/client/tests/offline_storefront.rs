//! End-to-end tests against an unreachable remote.
//!
//! The base URL points at a port nothing listens on, so every remote call
//! fails fast with a connection error and the whole storefront is exercised
//! through the local data path.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Once;

use vexa_client::checkout::ShippingAddress;
use vexa_client::types::{ProductQuery, ProductSort};
use vexa_client::{ClientConfig, ClientError, Storefront};
use vexa_core::{OrderStatus, PaymentMethod, Price, ProductId, Role};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn offline_storefront() -> (tempfile::TempDir, Storefront) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        // Port 9 (discard) is not listening; connections are refused.
        api_base_url: "http://127.0.0.1:9/api/v1".parse().unwrap(),
        storage_dir: PathBuf::from(dir.path()),
    };
    (dir, Storefront::new(&config))
}

async fn logged_in() -> (tempfile::TempDir, Storefront) {
    let (dir, mut store) = offline_storefront();
    store.login("john@example.com", "password123").await.unwrap();
    (dir, store)
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "John Doe".to_string(),
        phone: "9999999999".to_string(),
        address: "42 Some Street".to_string(),
        city: "Mumbai".to_string(),
        state: "MH".to_string(),
        pincode: "400001".to_string(),
    }
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn startup_without_token_stays_anonymous() {
    let (_dir, mut store) = offline_storefront();
    store.resolve_session().await;
    assert!(!store.session().is_authenticated());
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn login_with_known_email_works_offline() {
    let (_dir, mut store) = offline_storefront();
    let user = store.login("john@example.com", "anything").await.unwrap();
    assert_eq!(user.name, "John Doe");
    assert_eq!(user.role, Role::User);
    assert!(store.session().is_authenticated());
}

#[tokio::test]
async fn login_with_unknown_email_is_rejected() {
    let (_dir, mut store) = offline_storefront();
    let err = store.login("nobody@example.com", "pw").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(!store.session().is_authenticated());
}

#[tokio::test]
async fn session_survives_restart_via_persisted_token() {
    let (dir, mut store) = offline_storefront();
    store.login("admin@example.com", "pw").await.unwrap();
    drop(store);

    let config = ClientConfig {
        api_base_url: "http://127.0.0.1:9/api/v1".parse().unwrap(),
        storage_dir: PathBuf::from(dir.path()),
    };
    let mut restored = Storefront::new(&config);
    restored.resolve_session().await;

    assert!(restored.session().is_authenticated());
    assert!(restored.session().is_admin());
}

#[tokio::test]
async fn register_mismatched_passwords_rejected() {
    let (_dir, mut store) = offline_storefront();
    let err = store
        .register("Jane Doe", "jane@example.com", "pw1", "pw2")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn register_creates_working_session() {
    let (_dir, mut store) = offline_storefront();
    let user = store
        .register("Jane Doe", "jane@example.com", "pw", "pw")
        .await
        .unwrap();
    assert_eq!(user.role, Role::User);
    assert!(store.session().is_authenticated());

    store
        .add_to_cart(&ProductId::new("1"), 1, "M", "Black")
        .await
        .unwrap();
    assert_eq!(store.cart().item_count(), 1);
}

#[tokio::test]
async fn logout_empties_cart_without_touching_persisted_copy() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 2, "M", "Black")
        .await
        .unwrap();

    store.logout();
    assert!(!store.session().is_authenticated());
    assert!(store.cart().is_empty());

    // The persisted cart is still there for the next login.
    store.login("john@example.com", "pw").await.unwrap();
    assert_eq!(store.cart().item_count(), 2);
}

#[tokio::test]
async fn persisted_cart_is_not_shown_to_a_different_user() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 2, "M", "Black")
        .await
        .unwrap();
    store.logout();

    store.login("admin@example.com", "pw").await.unwrap();
    assert!(store.cart().is_empty());

    // The first user's cart is still waiting for them.
    store.logout();
    store.login("john@example.com", "pw").await.unwrap();
    assert_eq!(store.cart().item_count(), 2);
}

#[tokio::test]
async fn cleared_cart_stays_empty_after_restart() {
    let (dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 2, "M", "Black")
        .await
        .unwrap();
    store.clear_cart().await.unwrap();
    drop(store);

    let config = ClientConfig {
        api_base_url: "http://127.0.0.1:9/api/v1".parse().unwrap(),
        storage_dir: PathBuf::from(dir.path()),
    };
    let mut restored = Storefront::new(&config);
    restored.resolve_session().await;

    assert!(restored.session().is_authenticated());
    assert!(restored.cart().is_empty());
}

// =============================================================================
// Guards
// =============================================================================

#[tokio::test]
async fn cart_operations_require_authentication() {
    let (_dir, mut store) = offline_storefront();

    let err = store
        .add_to_cart(&ProductId::new("1"), 1, "M", "Black")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));

    let err = store.my_orders().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
}

#[tokio::test]
async fn admin_operations_require_admin_role() {
    let (_dir, mut store) = logged_in().await;
    let err = store.admin_stats().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));

    store.logout();
    store.login("admin@example.com", "pw").await.unwrap();
    let stats = store.admin_stats().await.unwrap();
    assert_eq!(stats.total_products, 6);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn catalog_is_served_offline_with_pagination() {
    let (_dir, store) = offline_storefront();
    let page = store.list_products(&ProductQuery::default()).await.unwrap();
    assert_eq!(page.items.len(), 6);
    assert_eq!(page.pagination.total, 6);
    assert_eq!(page.pagination.pages, 1);
}

#[tokio::test]
async fn catalog_filters_compose() {
    let (_dir, store) = offline_storefront();
    let query = ProductQuery {
        category: Some("Men".to_string()),
        max_price: Some(Price::new(600)),
        sort: Some(ProductSort::PriceAsc),
        ..ProductQuery::default()
    };
    let page = store.list_products(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "Classic Cotton T-Shirt");
}

#[tokio::test]
async fn keyword_search_is_case_insensitive() {
    let (_dir, store) = offline_storefront();
    let query = ProductQuery {
        keyword: Some("FORMAL".to_string()),
        ..ProductQuery::default()
    };
    let page = store.list_products(&query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].price, Price::new(1299));
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let (_dir, store) = offline_storefront();
    let err = store.get_product(&ProductId::new("999")).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn adding_same_identity_merges_lines() {
    let (_dir, mut store) = logged_in().await;
    let id = ProductId::new("1");

    store.add_to_cart(&id, 2, "M", "Black").await.unwrap();
    store.add_to_cart(&id, 1, "M", "Black").await.unwrap();

    assert_eq!(store.cart().lines().len(), 1);
    assert_eq!(store.cart().item_count(), 3);
}

#[tokio::test]
async fn different_size_or_color_stays_separate() {
    let (_dir, mut store) = logged_in().await;
    let id = ProductId::new("1");

    store.add_to_cart(&id, 1, "M", "Black").await.unwrap();
    store.add_to_cart(&id, 1, "L", "Black").await.unwrap();
    store.add_to_cart(&id, 1, "M", "White").await.unwrap();

    assert_eq!(store.cart().lines().len(), 3);
}

#[tokio::test]
async fn zero_quantity_add_is_rejected() {
    let (_dir, mut store) = logged_in().await;
    let err = store
        .add_to_cart(&ProductId::new("1"), 0, "M", "Black")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn set_quantity_below_one_removes_product() {
    let (_dir, mut store) = logged_in().await;
    let id = ProductId::new("1");
    store.add_to_cart(&id, 3, "M", "Black").await.unwrap();

    store.set_cart_quantity(&id, 0).await.unwrap();
    assert!(store.cart().is_empty());

    store.add_to_cart(&id, 3, "M", "Black").await.unwrap();
    store.set_cart_quantity(&id, -2).await.unwrap();
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn adding_unknown_product_is_not_found() {
    let (_dir, mut store) = logged_in().await;
    let err = store
        .add_to_cart(&ProductId::new("999"), 1, "M", "Black")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
    assert!(store.cart().is_empty());
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_totals_for_single_item() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 1, "M", "Black")
        .await
        .unwrap();

    let draft = store.order_draft();
    assert_eq!(draft.items_price, Price::new(599));
    assert_eq!(draft.shipping_price, Price::new(99));
    assert_eq!(draft.tax_price, Price::new(108));
    assert_eq!(draft.total_price, Price::new(806));
}

#[tokio::test]
async fn place_order_records_history_and_clears_cart() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 1, "M", "Black")
        .await
        .unwrap();

    let order = store
        .place_order(address(), PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, Price::new(806));
    assert_eq!(order.items.len(), 1);
    assert!(store.cart().is_empty());

    let history = store.my_orders().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, order.id);
}

#[tokio::test]
async fn free_shipping_above_threshold() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("6"), 1, "M", "White")
        .await
        .unwrap();

    let draft = store.order_draft();
    assert_eq!(draft.items_price, Price::new(1299));
    assert_eq!(draft.shipping_price, Price::ZERO);
}

#[tokio::test]
async fn incomplete_address_is_rejected_before_anything_happens() {
    let (_dir, mut store) = logged_in().await;
    store
        .add_to_cart(&ProductId::new("1"), 1, "M", "Black")
        .await
        .unwrap();

    let mut bad = address();
    bad.phone = String::new();
    let err = store
        .place_order(bad, PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(store.cart().item_count(), 1);
}

#[tokio::test]
async fn empty_cart_cannot_be_checked_out() {
    let (_dir, mut store) = logged_in().await;
    let err = store
        .place_order(address(), PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn dashboard_combines_stats_and_recent_orders() {
    let (_dir, mut store) = offline_storefront();
    store.login("admin@example.com", "pw").await.unwrap();

    store
        .add_to_cart(&ProductId::new("2"), 1, "M", "Navy")
        .await
        .unwrap();
    store
        .place_order(address(), PaymentMethod::Upi)
        .await
        .unwrap();

    let dashboard = store.dashboard().await.unwrap();
    assert_eq!(dashboard.stats.total_orders, 1);
    assert_eq!(dashboard.recent_orders.len(), 1);
    assert!(dashboard.stats.total_revenue > Price::ZERO);
}

#[tokio::test]
async fn admin_user_maintenance_offline() {
    let (_dir, mut store) = offline_storefront();
    store.login("admin@example.com", "pw").await.unwrap();

    let users = store.admin_users().await.unwrap();
    assert_eq!(users.len(), 2);

    let john = users
        .iter()
        .find(|user| user.email.as_str() == "john@example.com")
        .unwrap();
    let updated = store
        .admin_update_user(&john.id, Some("Johnny"), None, Some(Role::Admin))
        .await
        .unwrap();
    assert_eq!(updated.name, "Johnny");
    assert!(updated.role.is_admin());

    store.admin_delete_user(&john.id).await.unwrap();
    let err = store.admin_user(&john.id).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));
}
