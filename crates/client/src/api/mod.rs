//! Typed REST API client.
//!
//! Thin wrapper over `reqwest` that speaks the `{ success, data, message,
//! pagination }` envelope, attaches the bearer token when one is present,
//! and caches catalog reads with `moka` (5-minute TTL, search queries
//! uncached).
//!
//! Outcome classification matters more here than in a typical client: the
//! caller decides between surfacing an error and failing over to the local
//! provider based on [`ApiError::is_unavailable`]. A response the server
//! actually produced ([`ApiError::Rejected`]) is a rejection; everything
//! else means the remote cannot currently be trusted to answer.

pub mod conversions;
pub mod types;

use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use vexa_core::{Price, ProductId, UserId};

use crate::cart::CartLine;
use crate::config::ClientConfig;
use crate::types::{
    AdminStats, Order, Page, Pagination, PaymentOrder, PaymentReceipt, Product, ProductQuery, User,
};

use conversions::{
    convert_cart_item, convert_order, convert_payment_order, convert_product, convert_user,
};
use types::{
    AddToCartRequest, AdminUpdateUserRequest, AuthPayload, CreateOrderRequest,
    CreatePaymentRequest, Envelope, ErrorBody, LoginRequest, OrderPayload, PaymentOrderPayload,
    ProductPayload, RegisterRequest, UpdateCartItemRequest, UpdateDetailsRequest,
    UpdatePasswordRequest, UserPayload, VerifyPaymentRequest,
};

/// Errors that can occur when talking to the REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed: connection refused, DNS failure,
    /// timeout, or a broken body stream.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the promised envelope shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered and declined: non-success HTTP status or
    /// `success: false` in the envelope.
    #[error("API rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the response body.
        message: String,
    },

    /// The payload parsed but violated a domain invariant.
    #[error("invalid payload: {0}")]
    Invalid(String),

    /// Successful envelope with no data where data was required.
    #[error("missing data in response")]
    MissingData,
}

impl ApiError {
    /// Whether this failure means the remote is unavailable or misbehaving,
    /// as opposed to having deliberately rejected the request.
    ///
    /// Unavailable failures are absorbed by the fallback provider;
    /// rejections surface to the user.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// The server's message, when the failure was a rejection.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<T, ApiError> {
        self.data.ok_or(ApiError::MissingData)
    }
}

impl From<types::PaginationPayload> for Pagination {
    fn from(payload: types::PaginationPayload) -> Self {
        Self {
            page: payload.page,
            pages: payload.pages,
            count: payload.count,
            total: payload.total,
        }
    }
}

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
}

/// Client for the Vexa REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client from configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            cache,
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}/{path}", self.base_url));
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder
    }

    /// Send a request and decode the response envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|err| {
            tracing::error!(
                error = %err,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse API response envelope"
            );
            ApiError::Parse(err)
        })?;

        if !envelope.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request failed".to_string()),
            });
        }

        Ok(envelope)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<Envelope<T>, ApiError> {
        self.execute(self.request(Method::GET, path, token)).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        self.execute(self.request(method, path, token).json(body))
            .await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<Envelope<T>, ApiError> {
        self.execute(self.request(Method::DELETE, path, token))
            .await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Register a new account. Returns the user and the issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String), ApiError> {
        let body = RegisterRequest {
            name,
            email,
            password,
        };
        let payload: AuthPayload = self
            .send_json(Method::POST, "auth/register", None, &body)
            .await?
            .into_data()?;
        Ok((convert_user(payload.user)?, payload.token))
    }

    /// Log in with credentials. Returns the user and the issued token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are
    /// rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), ApiError> {
        let body = LoginRequest { email, password };
        let payload: AuthPayload = self
            .send_json(Method::POST, "auth/login", None, &body)
            .await?
            .into_data()?;
        Ok((convert_user(payload.user)?, payload.token))
    }

    /// Resolve the stored token to the current user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or the request fails.
    #[instrument(skip(self, token))]
    pub async fn me(&self, token: &SecretString) -> Result<User, ApiError> {
        let payload: UserPayload = self.get("auth/me", Some(token)).await?.into_data()?;
        convert_user(payload)
    }

    /// Update the profile of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, token))]
    pub async fn update_details(
        &self,
        name: &str,
        email: &str,
        token: &SecretString,
    ) -> Result<User, ApiError> {
        let body = UpdateDetailsRequest { name, email };
        let payload: UserPayload = self
            .send_json(Method::PUT, "auth/updatedetails", Some(token), &body)
            .await?
            .into_data()?;
        convert_user(payload)
    }

    /// Change the password of the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the current password is
    /// rejected.
    #[instrument(skip(self, current_password, new_password, token))]
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        let body = UpdatePasswordRequest {
            current_password,
            new_password,
        };
        self.send_json::<serde_json::Value, _>(
            Method::PUT,
            "auth/updatepassword",
            Some(token),
            &body,
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a filtered, sorted, paginated product list.
    ///
    /// Results are cached unless the query is a keyword search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let query_string = query.to_query_string();
        let cache_key = format!("products:{query_string}");

        if !query.is_search()
            && let Some(CacheValue::Products(page)) = self.cache.get(&cache_key).await
        {
            debug!("cache hit for product list");
            return Ok(page);
        }

        let path = if query_string.is_empty() {
            "products".to_string()
        } else {
            format!("products?{query_string}")
        };

        let envelope: Envelope<Vec<ProductPayload>> = self.get(&path, None).await?;
        let pagination = envelope.pagination.map(Pagination::from).unwrap_or_default();
        let items = envelope
            .into_data()?
            .into_iter()
            .map(convert_product)
            .collect::<Result<Vec<_>, _>>()?;

        let page = Page { items, pagination };

        if !query.is_search() {
            self.cache
                .insert(cache_key, CacheValue::Products(page.clone()))
                .await;
        }

        Ok(page)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let payload: ProductPayload = self
            .get(&format!("products/{product_id}"), None)
            .await?
            .into_data()?;
        let product = convert_product(payload)?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartLine>, ApiError> {
        let payloads: Vec<types::CartItemPayload> =
            self.get("cart", Some(token)).await?.into_data()?;
        payloads.into_iter().map(convert_cart_item).collect()
    }

    /// Add an item to the cart. The server performs the identity merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: &str,
        color: &str,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id: product_id.as_str(),
            quantity,
            size,
            color,
        };
        self.send_json::<serde_json::Value, _>(Method::POST, "cart", Some(token), &body)
            .await?;
        Ok(())
    }

    /// Overwrite the quantity of a cart item, matched by product id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        product_id: &ProductId,
        quantity: u32,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        let body = UpdateCartItemRequest { quantity };
        self.send_json::<serde_json::Value, _>(
            Method::PUT,
            &format!("cart/{product_id}"),
            Some(token),
            &body,
        )
        .await?;
        Ok(())
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_cart_item(
        &self,
        product_id: &ProductId,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("cart/{product_id}"), Some(token))
            .await?;
        Ok(())
    }

    /// Clear the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &SecretString) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>("cart", Some(token)).await?;
        Ok(())
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Create an order from the checkout payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, body, token))]
    pub async fn create_order(
        &self,
        body: &CreateOrderRequest,
        token: &SecretString,
    ) -> Result<Order, ApiError> {
        let payload: OrderPayload = self
            .send_json(Method::POST, "orders", Some(token), body)
            .await?
            .into_data()?;
        convert_order(payload)
    }

    /// Fetch the authenticated user's order history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        let payloads: Vec<OrderPayload> = self
            .get("orders/myorders", Some(token))
            .await?
            .into_data()?;
        payloads.into_iter().map(convert_order).collect()
    }

    /// Fetch all orders (admin), optionally limited and sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn all_orders(
        &self,
        query_string: &str,
        token: &SecretString,
    ) -> Result<Vec<Order>, ApiError> {
        let path = if query_string.is_empty() {
            "orders".to_string()
        } else {
            format!("orders?{query_string}")
        };
        let payloads: Vec<OrderPayload> = self.get(&path, Some(token)).await?.into_data()?;
        payloads.into_iter().map(convert_order).collect()
    }

    // =========================================================================
    // Admin Methods
    // =========================================================================

    /// Fetch aggregate store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_stats(&self, token: &SecretString) -> Result<AdminStats, ApiError> {
        self.get("admin/stats", Some(token)).await?.into_data()
    }

    /// List all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_users(&self, token: &SecretString) -> Result<Vec<User>, ApiError> {
        let payloads: Vec<UserPayload> = self.get("admin/users", Some(token)).await?.into_data()?;
        payloads.into_iter().map(convert_user).collect()
    }

    /// Fetch a single account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn admin_user(
        &self,
        user_id: &UserId,
        token: &SecretString,
    ) -> Result<User, ApiError> {
        let payload: UserPayload = self
            .get(&format!("admin/users/{user_id}"), Some(token))
            .await?
            .into_data()?;
        convert_user(payload)
    }

    /// Update an account's profile or role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn admin_update_user(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        email: Option<&str>,
        role: Option<&str>,
        token: &SecretString,
    ) -> Result<User, ApiError> {
        let body = AdminUpdateUserRequest { name, email, role };
        let payload: UserPayload = self
            .send_json(
                Method::PUT,
                &format!("admin/users/{user_id}"),
                Some(token),
                &body,
            )
            .await?
            .into_data()?;
        convert_user(payload)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn admin_delete_user(
        &self,
        user_id: &UserId,
        token: &SecretString,
    ) -> Result<(), ApiError> {
        self.delete::<serde_json::Value>(&format!("admin/users/{user_id}"), Some(token))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// Create a payment order with the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn create_payment(
        &self,
        amount: Price,
        token: &SecretString,
    ) -> Result<PaymentOrder, ApiError> {
        let body = CreatePaymentRequest {
            amount: amount.amount(),
        };
        let payload: PaymentOrderPayload = self
            .send_json(Method::POST, "payment/orders", Some(token), &body)
            .await?
            .into_data()?;
        convert_payment_order(payload)
    }

    /// Verify a payment with the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or verification is rejected.
    #[instrument(skip(self, token))]
    pub async fn verify_payment(
        &self,
        payment_order: &PaymentOrder,
        token: &SecretString,
    ) -> Result<PaymentReceipt, ApiError> {
        let body = VerifyPaymentRequest {
            payment_id: payment_order.id.as_str(),
        };
        self.send_json::<serde_json::Value, _>(Method::POST, "payment/verify", Some(token), &body)
            .await?;
        Ok(PaymentReceipt {
            payment_id: payment_order.id.clone(),
            verified: true,
        })
    }
}
