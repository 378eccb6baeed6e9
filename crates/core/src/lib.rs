//! Nona Store Core - Shared domain types.
//!
//! This crate provides the types shared by every Nona storefront component:
//! products as delivered by the remote feed, the closed category set, prices,
//! and the locally persisted cart.
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! network, no storage access. Persistence and presentation live in the
//! `storefront` crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, categories, products and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
