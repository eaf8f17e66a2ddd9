//! Stride prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError, Category, Product},
    coupons::{AppliedCoupon, Coupon, CouponBook, CouponDiscount, CouponError},
    fixtures::{Fixture, FixtureError},
    identity::{AuthError, User},
    orders::{
        AddressError, Order, OrderError, OrderItem, OrderStatus, ShippingAddress, create_order,
    },
    receipt::{ReceiptError, write_order},
    session::{Session, SessionError},
    storage::{CollectionStore, MemoryStore, StorageError, keys},
    wishlist::{Wishlist, WishlistError},
};
