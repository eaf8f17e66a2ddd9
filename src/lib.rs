//! Stride
//!
//! Stride is a storefront core for a small footwear shop: catalog browsing, cart and wishlist management, coupon validation, order assembly and local-storage-style persistence.

pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod fixtures;
pub mod identity;
pub mod orders;
pub mod prelude;
pub mod receipt;
pub mod session;
pub mod storage;
pub mod utils;
pub mod wishlist;
