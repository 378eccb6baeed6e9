//! Core types for the Nona storefront.
//!
//! This module provides type-safe wrappers for the catalog and cart domain.

pub mod cart;
pub mod category;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, CartItem};
pub use category::Category;
pub use id::ProductId;
pub use price::{Price, PriceError};
pub use product::Product;
