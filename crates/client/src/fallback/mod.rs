//! Offline data provider.
//!
//! When the remote API is unreachable the storefront keeps working against
//! this provider: a fixed in-memory catalog, a cart persisted in local
//! storage, and a per-session identity directory and order book. Everything
//! here returns the same shapes the remote path produces, so callers cannot
//! tell which path served them.
//!
//! Identity here is deliberately weak. Locally issued tokens carry a
//! `local-` prefix and resolve only within this provider; they are never
//! sent to the remote as credentials.

pub mod catalog;

use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use secrecy::SecretString;
use tracing::instrument;
use uuid::Uuid;

use vexa_core::{Email, OrderId, OrderStatus, PaymentId, PaymentMethod, Price, ProductId, Role, UserId};

use crate::cart::{Cart, ProductSnapshot};
use crate::checkout::{OrderDraft, ShippingAddress};
use crate::error::{ClientError, Result};
use crate::storage::{LocalStorage, cart_key};
use crate::types::{
    AdminStats, Order, OrderItem, Page, PaymentOrder, PaymentReceipt, Product, ProductQuery, User,
};

const LOCAL_TOKEN_PREFIX: &str = "local-";

/// Serves catalog, cart, identity, and order operations without a remote.
pub struct FallbackProvider {
    catalog: Vec<Product>,
    storage: LocalStorage,
    users: Mutex<Vec<User>>,
    orders: Mutex<Vec<Order>>,
}

impl FallbackProvider {
    /// Create a provider persisting its cart through `storage`.
    #[must_use]
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            catalog: catalog::seed_catalog(),
            storage,
            users: Mutex::new(known_users()),
            orders: Mutex::new(Vec::new()),
        }
    }

    fn users(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn orders(&self) -> std::sync::MutexGuard<'_, Vec<Order>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Log in against the local directory. Any password is accepted for a
    /// known email; credentials are not verifiable offline.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an unknown email.
    #[instrument(skip(self, _password))]
    pub fn login(&self, email: &str, _password: &str) -> Result<(User, SecretString)> {
        let users = self.users();
        let user = users
            .iter()
            .find(|user| user.email.as_str().eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| ClientError::validation("Invalid email or password"))?;

        let token = local_token(&user.id);
        Ok((user, token))
    }

    /// Register a new local account and issue a token for it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a malformed email or one that
    /// is already registered.
    #[instrument(skip(self, _password))]
    pub fn register(&self, name: &str, email: &str, _password: &str) -> Result<(User, SecretString)> {
        let email = Email::parse(email)
            .map_err(|_| ClientError::validation("Please provide a valid email"))?;

        let mut users = self.users();
        if users
            .iter()
            .any(|user| user.email.as_str().eq_ignore_ascii_case(email.as_str()))
        {
            return Err(ClientError::validation("User already exists"));
        }

        let user = User {
            id: UserId::new(Uuid::new_v4().to_string()),
            name: name.to_string(),
            email,
            role: Role::User,
        };
        users.push(user.clone());

        let token = local_token(&user.id);
        Ok((user, token))
    }

    /// Resolve a locally issued token back to its user.
    #[must_use]
    pub fn resolve_token(&self, token: &str) -> Option<User> {
        let user_id = token.strip_prefix(LOCAL_TOKEN_PREFIX)?;
        self.users()
            .iter()
            .find(|user| user.id.as_str() == user_id)
            .cloned()
    }

    /// Update a user's profile in the local directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id and
    /// [`ClientError::Validation`] for a malformed email.
    pub fn update_user(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<Role>,
    ) -> Result<User> {
        let email = email
            .map(|email| {
                Email::parse(email)
                    .map_err(|_| ClientError::validation("Please provide a valid email"))
            })
            .transpose()?;

        let mut users = self.users();
        let user = users
            .iter_mut()
            .find(|user| user.id == *user_id)
            .ok_or_else(|| ClientError::NotFound(format!("user {user_id}")))?;

        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(role) = role {
            user.role = role;
        }
        Ok(user.clone())
    }

    /// Remove a user from the local directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub fn delete_user(&self, user_id: &UserId) -> Result<()> {
        let mut users = self.users();
        let before = users.len();
        users.retain(|user| user.id != *user_id);
        if users.len() == before {
            return Err(ClientError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    /// Get one user from the local directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub fn user(&self, user_id: &UserId) -> Result<User> {
        self.users()
            .iter()
            .find(|user| user.id == *user_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("user {user_id}")))
    }

    /// All users in the local directory.
    #[must_use]
    pub fn all_users(&self) -> Vec<User> {
        self.users().clone()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Filtered, sorted, paginated view over the built-in catalog.
    #[must_use]
    pub fn list_products(&self, query: &ProductQuery) -> Page<Product> {
        catalog::query_catalog(&self.catalog, query)
    }

    /// Look a product up in the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub fn get_product(&self, product_id: &ProductId) -> Result<Product> {
        self.catalog
            .iter()
            .find(|product| product.id == *product_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("product {product_id}")))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Load a user's persisted cart. An absent cart is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the cart file exists but cannot
    /// be read.
    pub fn load_cart(&self, user_id: &UserId) -> Result<Cart> {
        Ok(self.storage.get(&cart_key(user_id))?.unwrap_or_default())
    }

    fn save_cart(&self, user_id: &UserId, cart: &Cart) -> Result<()> {
        self.storage.set(&cart_key(user_id), cart)?;
        Ok(())
    }

    /// Add an item to a user's persisted cart, merging by identity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the cart cannot be read or
    /// written.
    #[instrument(skip(self, product), fields(user_id = %user_id, product_id = %product.id))]
    pub fn add_to_cart(
        &self,
        user_id: &UserId,
        product: &Product,
        quantity: u32,
        size: &str,
        color: &str,
    ) -> Result<Cart> {
        let mut cart = self.load_cart(user_id)?;
        cart.add(ProductSnapshot::of(product), quantity, size, color);
        self.save_cart(user_id, &cart)?;
        Ok(cart)
    }

    /// Overwrite the quantity of the matching cart lines, by product id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the cart cannot be read or
    /// written.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub fn update_cart_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        let mut cart = self.load_cart(user_id)?;
        cart.set_quantity(product_id, quantity);
        self.save_cart(user_id, &cart)?;
        Ok(cart)
    }

    /// Remove a product from a user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the cart cannot be read or
    /// written.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub fn remove_cart_item(&self, user_id: &UserId, product_id: &ProductId) -> Result<Cart> {
        let mut cart = self.load_cart(user_id)?;
        cart.remove(product_id);
        self.save_cart(user_id, &cart)?;
        Ok(cart)
    }

    /// Empty a user's persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the cart cannot be written.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn clear_cart(&self, user_id: &UserId) -> Result<Cart> {
        let cart = Cart::new();
        self.save_cart(user_id, &cart)?;
        Ok(cart)
    }

    // =========================================================================
    // Orders and Payments
    // =========================================================================

    /// Synthesize an order from the checkout inputs and record it in the
    /// session order book.
    #[must_use]
    #[instrument(skip(self, cart, address))]
    pub fn create_order(
        &self,
        cart: &Cart,
        address: ShippingAddress,
        payment_method: PaymentMethod,
        draft: OrderDraft,
    ) -> Order {
        let order = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product.id.clone(),
                    name: line.product.name.clone(),
                    price: line.product.price,
                    quantity: line.quantity,
                    size: line.size.clone(),
                    color: line.color.clone(),
                    image: line.product.image.clone(),
                })
                .collect(),
            shipping_address: address,
            payment_method,
            items_price: draft.items_price,
            shipping_price: draft.shipping_price,
            tax_price: draft.tax_price,
            total_price: draft.total_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        self.orders().push(order.clone());
        order
    }

    /// Orders placed during this session, newest first.
    #[must_use]
    pub fn my_orders(&self) -> Vec<Order> {
        let mut orders = self.orders().clone();
        orders.sort_by_key(|order| std::cmp::Reverse(order.created_at));
        orders
    }

    /// The `limit` most recent orders of the session.
    #[must_use]
    pub fn recent_orders(&self, limit: usize) -> Vec<Order> {
        let mut orders = self.my_orders();
        orders.truncate(limit);
        orders
    }

    /// Issue a local payment order.
    #[must_use]
    pub fn create_payment(&self, amount: Price) -> PaymentOrder {
        PaymentOrder {
            id: PaymentId::new(format!("{LOCAL_TOKEN_PREFIX}{}", Uuid::new_v4())),
            amount,
        }
    }

    /// Verify a local payment. Always succeeds; there is no gateway to ask.
    #[must_use]
    pub fn verify_payment(&self, payment_order: &PaymentOrder) -> PaymentReceipt {
        PaymentReceipt {
            payment_id: payment_order.id.clone(),
            verified: true,
        }
    }

    /// Aggregate statistics over the local directory, catalog, and session
    /// order book.
    #[must_use]
    pub fn stats(&self) -> AdminStats {
        let orders = self.orders();
        AdminStats {
            total_users: self.users().len() as u64,
            total_products: self.catalog.len() as u64,
            total_orders: orders.len() as u64,
            total_revenue: orders.iter().map(|order| order.total_price).sum(),
        }
    }
}

fn local_token(user_id: &UserId) -> SecretString {
    SecretString::from(format!("{LOCAL_TOKEN_PREFIX}{user_id}"))
}

fn known_users() -> Vec<User> {
    [
        ("user1", "John Doe", "john@example.com", Role::User),
        ("admin1", "Admin User", "admin@example.com", Role::Admin),
    ]
    .into_iter()
    .filter_map(|(id, name, email, role)| {
        Some(User {
            id: UserId::new(id),
            name: name.to_string(),
            email: Email::parse(email).ok()?,
            role,
        })
    })
    .collect()
}
