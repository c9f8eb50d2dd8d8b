//! Vexa Core - Shared types library.
//!
//! This crate provides the common types used across the Vexa storefront
//! client. It contains only types - no I/O, no HTTP, no persistence - so it
//! stays lightweight and can be depended on from anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
