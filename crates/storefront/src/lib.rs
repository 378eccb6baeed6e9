//! Nona Store storefront library.
//!
//! Catalog state fed by a remote product feed, a locally persisted cart, a
//! modal image gallery and a checkout hand-off, exposed to the presentation
//! layer through a JSON API. The crate is a library so the whole storefront
//! can be driven from tests without a network.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod gallery;
pub mod locale;
pub mod notifications;
pub mod routes;
pub mod search;
pub mod state;
