//! Vexa storefront client.
//!
//! A thin, typed client over the Vexa REST API with a deterministic local
//! fallback: every remote-backed operation first attempts the network call
//! and, if the backend is unreachable, is served from a fixed in-memory
//! catalog and locally persisted state instead. Calling code never sees
//! which path answered.
//!
//! # Architecture
//!
//! - [`storefront::Storefront`] - the owned state container: session, cart,
//!   and the remote-or-fallback dispatch for every operation
//! - [`api`] - typed REST client (`reqwest`) with response-envelope handling
//!   and a short-lived catalog cache (`moka`)
//! - [`fallback`] - the local data provider used when the remote fails
//! - [`cart`] - pure cart reconciliation: identity merge and derived totals
//! - [`checkout`] - order draft pricing and shipping address validation
//! - [`storage`] - token and cart persistence under well-known keys
//!
//! # Example
//!
//! ```rust,ignore
//! use vexa_client::{ClientConfig, Storefront};
//! use vexa_core::ProductId;
//!
//! let mut store = Storefront::new(&ClientConfig::from_env()?);
//! store.resolve_session().await;
//!
//! store.login("john@example.com", "hunter2").await?;
//! store.add_to_cart(&ProductId::new("1"), 1, "M", "Black").await?;
//! assert_eq!(store.cart().item_count(), 1);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod fallback;
pub mod session;
pub mod storage;
pub mod storefront;
pub mod types;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use storefront::Storefront;
