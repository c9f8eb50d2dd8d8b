//! The storefront state container.
//!
//! Owns the session, the in-memory cart, and both data paths: the remote
//! REST API and the local fallback provider. Every operation attempts the
//! remote first and fails over when the remote is unavailable; a deliberate
//! rejection from the remote (bad credentials, wrong password) surfaces as a
//! [`ClientError::Validation`] instead of falling back.
//!
//! Guard checks happen before any other work: operations on the session's
//! cart, orders, or profile return [`ClientError::AuthRequired`] for an
//! anonymous session, and the admin operations additionally require the
//! admin role.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use vexa_core::{PaymentMethod, ProductId, Role, UserId};

use crate::api::types::{CreateOrderRequest, OrderItemPayload, ShippingAddressPayload};
use crate::api::{ApiClient, ApiError};
use crate::cart::{Cart, CartLine};
use crate::checkout::{OrderDraft, ShippingAddress};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::fallback::FallbackProvider;
use crate::session::Session;
use crate::storage::{LocalStorage, TOKEN_KEY};
use crate::types::{
    AdminStats, Dashboard, Order, Page, PaymentOrder, PaymentReceipt, Product, ProductQuery, User,
};

/// How many orders the dashboard shows.
const DASHBOARD_RECENT_ORDERS: usize = 5;

/// The storefront: session, cart, and remote-or-fallback dispatch.
pub struct Storefront {
    api: ApiClient,
    fallback: FallbackProvider,
    storage: LocalStorage,
    session: Session,
    cart: Cart,
}

impl Storefront {
    /// Create a storefront from configuration. The session starts anonymous;
    /// call [`Self::resolve_session`] to restore a persisted one.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let storage = LocalStorage::new(&config.storage_dir);
        Self {
            api: ApiClient::new(config),
            fallback: FallbackProvider::new(storage.clone()),
            storage,
            session: Session::new(),
            cart: Cart::new(),
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The current session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn token(&self) -> Result<SecretString> {
        self.session
            .token()
            .cloned()
            .ok_or(ClientError::AuthRequired)
    }

    fn guard(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::AuthRequired)
        }
    }

    fn guard_admin(&self) -> Result<()> {
        self.guard()?;
        if self.session.is_admin() {
            Ok(())
        } else {
            Err(ClientError::AuthRequired)
        }
    }

    /// Restore the session from the persisted token, if there is one.
    ///
    /// This is the startup path and it never fails: a missing token leaves
    /// the session anonymous, an unreachable remote falls back to local
    /// token resolution, and a token neither path recognizes is discarded.
    #[instrument(skip(self))]
    pub async fn resolve_session(&mut self) {
        let stored: Option<String> = match self.storage.get(TOKEN_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "could not read persisted token");
                None
            }
        };
        let Some(raw) = stored else {
            debug!("no persisted token, starting anonymous");
            return;
        };

        let token = SecretString::from(raw.clone());
        let user = match self.api.me(&token).await {
            Ok(user) => Some(user),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "remote unavailable, resolving token locally");
                self.fallback.resolve_token(&raw)
            }
            Err(err) => {
                debug!(error = %err, "persisted token rejected");
                None
            }
        };

        match user {
            Some(user) => {
                self.session.authenticate(user, token);
                self.refresh_cart().await;
            }
            None => {
                if let Err(err) = self.storage.remove(TOKEN_KEY) {
                    warn!(error = %err, "could not discard stale token");
                }
            }
        }
    }

    /// Log in and load the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the credentials are rejected
    /// (remotely, or locally against the known directory when the remote is
    /// unavailable) or the token cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User> {
        let (user, token) = match self.api.login(email, password).await {
            Ok((user, token)) => (user, SecretString::from(token)),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "remote unavailable, logging in locally");
                self.fallback.login(email, password)?
            }
            Err(err) => return Err(reject_to_validation(err)),
        };

        self.establish(user.clone(), token).await?;
        Ok(user)
    }

    /// Register an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the passwords do not match,
    /// the registration is rejected, or the token cannot be persisted.
    #[instrument(skip(self, password, confirm_password))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User> {
        if password != confirm_password {
            return Err(ClientError::validation("Passwords do not match"));
        }

        let (user, token) = match self.api.register(name, email, password).await {
            Ok((user, token)) => (user, SecretString::from(token)),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "remote unavailable, registering locally");
                self.fallback.register(name, email, password)?
            }
            Err(err) => return Err(reject_to_validation(err)),
        };

        self.establish(user.clone(), token).await?;
        Ok(user)
    }

    /// Persist the token, authenticate the session, and load the cart.
    ///
    /// The token write happens before the session flips so a write failure
    /// leaves the session anonymous instead of authenticated-but-forgotten.
    async fn establish(&mut self, user: User, token: SecretString) -> Result<()> {
        self.storage
            .set(TOKEN_KEY, &token.expose_secret().to_string())?;
        self.session.authenticate(user, token);
        self.refresh_cart().await;
        Ok(())
    }

    /// End the session.
    ///
    /// Clears the session and the in-memory cart. The persisted cart is left
    /// untouched so it survives for the next login; only the token is
    /// removed.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        if let Err(err) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %err, "could not remove persisted token");
        }
        self.session.clear();
        self.cart.clear();
    }

    /// Update the profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session and
    /// [`ClientError::Validation`] when the update is rejected.
    #[instrument(skip(self))]
    pub async fn update_details(&mut self, name: &str, email: &str) -> Result<User> {
        self.guard()?;
        let token = self.token()?;

        let user = match self.api.update_details(name, email, &token).await {
            Ok(user) => user,
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "remote unavailable, updating profile locally");
                let user_id = self.current_user_id()?;
                self.fallback
                    .update_user(&user_id, Some(name), Some(email), None)?
            }
            Err(err) => return Err(reject_to_validation(err)),
        };

        self.session.update_user(user.clone());
        Ok(user)
    }

    /// Change the password of the authenticated user.
    ///
    /// When the remote is unavailable this is a no-op: the local directory
    /// does not verify passwords, so there is nothing to change.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the new passwords do not
    /// match or the current password is rejected.
    #[instrument(skip(self, current_password, new_password, confirm_password))]
    pub async fn update_password(
        &mut self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        if new_password != confirm_password {
            return Err(ClientError::validation("Passwords do not match"));
        }
        self.guard()?;
        let token = self.token()?;

        match self
            .api
            .update_password(current_password, new_password, &token)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "remote unavailable, password unchanged locally");
                Ok(())
            }
            Err(err) => Err(reject_to_validation(err)),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// A filtered, sorted, paginated product listing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] only in degenerate local failures;
    /// remote failures are absorbed by the built-in catalog.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>> {
        match self.api.list_products(query).await {
            Ok(page) => Ok(page),
            Err(err) => {
                warn!(error = %err, "serving product list from built-in catalog");
                Ok(self.fallback.list_products(query))
            }
        }
    }

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] when neither the remote nor the
    /// built-in catalog knows the id.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product> {
        match self.api.get_product(product_id).await {
            Ok(product) => Ok(product),
            Err(err) => {
                warn!(error = %err, "serving product from built-in catalog");
                self.fallback.get_product(product_id)
            }
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The in-memory cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Reload the cart for the authenticated session: from the remote when
    /// reachable, from local storage otherwise. Anonymous sessions keep an
    /// empty cart.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&mut self) {
        let Ok(token) = self.token() else {
            return;
        };
        let Ok(user_id) = self.current_user_id() else {
            return;
        };

        self.cart = match self.api.fetch_cart(&token).await {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                warn!(error = %err, "loading cart from local storage");
                match self.fallback.load_cart(&user_id) {
                    Ok(cart) => cart,
                    Err(err) => {
                        warn!(error = %err, "persisted cart unreadable, starting empty");
                        Cart::new()
                    }
                }
            }
        };
    }

    /// Add a product to the cart.
    ///
    /// The product is resolved first so the cart line carries a trusted
    /// snapshot; both resolution and the mutation itself fail over to the
    /// local path independently.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session,
    /// [`ClientError::Validation`] for a zero quantity, and
    /// [`ClientError::NotFound`] for an unknown product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
        color: &str,
    ) -> Result<()> {
        self.guard()?;
        if quantity == 0 {
            return Err(ClientError::validation("Quantity must be at least 1"));
        }
        let token = self.token()?;
        let user_id = self.current_user_id()?;
        let product = self.get_product(product_id).await?;

        let remote = async {
            self.api
                .add_to_cart(product_id, quantity, size, color, &token)
                .await?;
            self.api.fetch_cart(&token).await
        };
        self.cart = match remote.await {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                warn!(error = %err, "adding to cart locally");
                self.fallback
                    .add_to_cart(&user_id, &product, quantity, size, color)?
            }
        };
        Ok(())
    }

    /// Set the quantity of every cart line for a product, matched by id
    /// alone. A quantity below one removes the product.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_cart_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<()> {
        self.guard()?;
        if quantity < 1 {
            return self.remove_from_cart(product_id).await;
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| ClientError::validation("Quantity is out of range"))?;
        let token = self.token()?;
        let user_id = self.current_user_id()?;

        let remote = async {
            self.api
                .update_cart_item(product_id, quantity, &token)
                .await?;
            self.api.fetch_cart(&token).await
        };
        self.cart = match remote.await {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                warn!(error = %err, "updating cart locally");
                self.fallback
                    .update_cart_item(&user_id, product_id, quantity)?
            }
        };
        Ok(())
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<()> {
        self.guard()?;
        let token = self.token()?;
        let user_id = self.current_user_id()?;

        let remote = async {
            self.api.remove_cart_item(product_id, &token).await?;
            self.api.fetch_cart(&token).await
        };
        self.cart = match remote.await {
            Ok(lines) => Cart::from_lines(lines),
            Err(err) => {
                warn!(error = %err, "removing from cart locally");
                self.fallback.remove_cart_item(&user_id, product_id)?
            }
        };
        Ok(())
    }

    /// Empty the cart, in memory and in the persisted copy.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session.
    #[instrument(skip(self))]
    pub async fn clear_cart(&mut self) -> Result<()> {
        self.guard()?;
        let token = self.token()?;
        let user_id = self.current_user_id()?;

        if let Err(err) = self.api.clear_cart(&token).await {
            warn!(error = %err, "remote cart not cleared");
        }
        self.cart = self.fallback.clear_cart(&user_id)?;
        Ok(())
    }

    // =========================================================================
    // Checkout and Orders
    // =========================================================================

    /// The checkout summary for the current cart.
    #[must_use]
    pub fn order_draft(&self) -> OrderDraft {
        OrderDraft::from_cart(&self.cart)
    }

    /// Place an order for the current cart: validate, take payment, create
    /// the order, then empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session and
    /// [`ClientError::Validation`] for an incomplete address, an empty cart,
    /// or a rejected payment.
    #[instrument(skip(self, address))]
    pub async fn place_order(
        &mut self,
        address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Order> {
        self.guard()?;
        address.validate()?;
        if self.cart.is_empty() {
            return Err(ClientError::validation("Your cart is empty"));
        }
        let token = self.token()?;
        let draft = self.order_draft();

        let receipt = self.take_payment(&draft, &token).await?;
        debug!(payment_id = %receipt.payment_id, "payment verified");

        let request = build_order_request(&self.cart, &address, payment_method, &draft);
        let order = match self.api.create_order(&request, &token).await {
            Ok(order) => order,
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "recording order locally");
                self.fallback
                    .create_order(&self.cart, address, payment_method, draft)
            }
            Err(err) => return Err(reject_to_validation(err)),
        };

        self.clear_cart().await?;
        Ok(order)
    }

    async fn take_payment(
        &self,
        draft: &OrderDraft,
        token: &SecretString,
    ) -> Result<PaymentReceipt> {
        let payment: PaymentOrder = match self.api.create_payment(draft.total_price, token).await {
            Ok(payment) => match self.api.verify_payment(&payment, token).await {
                Ok(receipt) => return Ok(receipt),
                Err(err) if err.is_unavailable() => {
                    warn!(error = %err, "verifying payment locally");
                    payment
                }
                Err(err) => return Err(reject_to_validation(err)),
            },
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "taking payment locally");
                self.fallback.create_payment(draft.total_price)
            }
            Err(err) => return Err(reject_to_validation(err)),
        };

        Ok(self.fallback.verify_payment(&payment))
    }

    /// The authenticated user's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] for an anonymous session.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        self.guard()?;
        let token = self.token()?;

        match self.api.my_orders(&token).await {
            Ok(orders) => Ok(orders),
            Err(err) => {
                warn!(error = %err, "serving order history from this session");
                Ok(self.fallback.my_orders())
            }
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Aggregate store statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats> {
        self.guard_admin()?;
        let token = self.token()?;

        match self.api.admin_stats(&token).await {
            Ok(stats) => Ok(stats),
            Err(err) => {
                warn!(error = %err, "serving stats from local state");
                Ok(self.fallback.stats())
            }
        }
    }

    /// Everything the admin dashboard renders, fetched concurrently. Each
    /// half fails over on its own, so a partial remote outage degrades only
    /// the affected half.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.guard_admin()?;
        let token = self.token()?;

        let recent_query = format!("limit={DASHBOARD_RECENT_ORDERS}&sort=-createdAt");
        let (stats, recent) = tokio::join!(
            self.api.admin_stats(&token),
            self.api.all_orders(&recent_query, &token),
        );

        let stats = stats.unwrap_or_else(|err| {
            warn!(error = %err, "serving stats from local state");
            self.fallback.stats()
        });
        let recent_orders = recent.unwrap_or_else(|err| {
            warn!(error = %err, "serving recent orders from this session");
            self.fallback.recent_orders(DASHBOARD_RECENT_ORDERS)
        });

        Ok(Dashboard {
            stats,
            recent_orders,
        })
    }

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<User>> {
        self.guard_admin()?;
        let token = self.token()?;

        match self.api.admin_users(&token).await {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!(error = %err, "serving users from local directory");
                Ok(self.fallback.all_users())
            }
        }
    }

    /// One account by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role, or [`ClientError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn admin_user(&self, user_id: &UserId) -> Result<User> {
        self.guard_admin()?;
        let token = self.token()?;

        match self.api.admin_user(user_id, &token).await {
            Ok(user) => Ok(user),
            Err(err) => {
                warn!(error = %err, "serving user from local directory");
                self.fallback.user(user_id)
            }
        }
    }

    /// Update an account's profile or role.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role, [`ClientError::NotFound`] for an unknown id, or
    /// [`ClientError::Validation`] when the update is rejected.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn admin_update_user(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<Role>,
    ) -> Result<User> {
        self.guard_admin()?;
        let token = self.token()?;

        let role_str = role.map(|role| if role.is_admin() { "admin" } else { "user" });
        match self
            .api
            .admin_update_user(user_id, name, email, role_str, &token)
            .await
        {
            Ok(user) => Ok(user),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "updating user in local directory");
                self.fallback.update_user(user_id, name, email, role)
            }
            Err(err) => Err(reject_to_validation(err)),
        }
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] unless the session holds the
    /// admin role, or [`ClientError::NotFound`] for an unknown id.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn admin_delete_user(&self, user_id: &UserId) -> Result<()> {
        self.guard_admin()?;
        let token = self.token()?;

        match self.api.admin_delete_user(user_id, &token).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "deleting user from local directory");
                self.fallback.delete_user(user_id)
            }
            Err(err) => Err(reject_to_validation(err)),
        }
    }

    fn current_user_id(&self) -> Result<UserId> {
        self.session
            .user()
            .map(|user| user.id.clone())
            .ok_or(ClientError::AuthRequired)
    }
}

/// Map a deliberate remote rejection onto the client taxonomy, preserving
/// the server's message.
fn reject_to_validation(err: ApiError) -> ClientError {
    match err {
        ApiError::Rejected { status: 404, message } => ClientError::NotFound(message),
        ApiError::Rejected { message, .. } => ClientError::Validation(message),
        other => ClientError::Validation(other.to_string()),
    }
}

fn build_order_request(
    cart: &Cart,
    address: &ShippingAddress,
    payment_method: PaymentMethod,
    draft: &OrderDraft,
) -> CreateOrderRequest {
    CreateOrderRequest {
        items: cart.lines().iter().map(order_item_payload).collect(),
        shipping_address: ShippingAddressPayload {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            address: address.address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.clone(),
        },
        payment_method: payment_method_wire(payment_method).to_string(),
        items_price: draft.items_price.amount(),
        shipping_price: draft.shipping_price.amount(),
        tax_price: draft.tax_price.amount(),
        total_price: draft.total_price.amount(),
    }
}

fn order_item_payload(line: &CartLine) -> OrderItemPayload {
    OrderItemPayload {
        product: line.product.id.to_string(),
        name: line.product.name.clone(),
        price: line.product.price.amount(),
        quantity: line.quantity,
        size: line.size.clone(),
        color: line.color.clone(),
        image: line.product.image.clone(),
    }
}

const fn payment_method_wire(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Card => "card",
        PaymentMethod::Upi => "upi",
        PaymentMethod::Cod => "cod",
    }
}
