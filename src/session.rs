//! Session
//!
//! A single shopper's view of the storefront: read-only catalog and coupon
//! reference data, an explicit [`CollectionStore`] passed in by the caller,
//! and an optional signed-in user. Every mutation loads the affected
//! collection, applies the change and saves it back before returning, so
//! persistence timing is explicit and read-after-write holds within the
//! session. There are no hidden globals; the UI layer re-reads after each
//! mutation.

use jiff::Zoned;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::Catalog,
    coupons::{AppliedCoupon, CouponBook, CouponError},
    identity::{self, AuthError, User},
    orders::{self, Order, OrderError, ShippingAddress},
    storage::{self, CollectionStore, StorageError, keys},
    wishlist::{Wishlist, WishlistError},
};

/// Errors surfaced by session operations.
///
/// Every failure is recoverable and typed; no session operation aborts.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Cart, wishlist and order mutations need a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    /// Mock-auth failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Cart failure.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wishlist failure.
    #[error(transparent)]
    Wishlist(#[from] WishlistError),

    /// Coupon rejection.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Order assembly failure.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Persistence write failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A single shopper's storefront session.
#[derive(Debug)]
pub struct Session<'a, S> {
    catalog: &'a Catalog,
    coupons: &'a CouponBook,
    store: S,
    user: Option<User>,
}

impl<'a, S: CollectionStore> Session<'a, S> {
    /// Open a session over `store`, restoring any persisted user.
    pub fn new(catalog: &'a Catalog, coupons: &'a CouponBook, store: S) -> Self {
        let user = storage::load_one(&store, keys::USER);

        Session {
            catalog,
            coupons,
            store,
            user,
        }
    }

    /// The currently signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The catalog this session browses.
    #[must_use]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Consume the session, returning its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Register and sign in a new shopper.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the fields fail mock-auth validation,
    /// or a [`StorageError`] if the user cannot be persisted.
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<&User, SessionError> {
        let user = identity::sign_up(email, password, full_name)?;

        storage::save_one(&mut self.store, keys::USER, &user)?;
        debug!(email, "signed up");

        Ok(self.user.insert(user))
    }

    /// Sign an existing shopper in.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the credentials fail mock-auth
    /// validation, or a [`StorageError`] if the user cannot be persisted.
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<&User, SessionError> {
        let user = identity::sign_in(email, password)?;

        storage::save_one(&mut self.store, keys::USER, &user)?;
        debug!(email, "signed in");

        Ok(self.user.insert(user))
    }

    /// Sign out, forgetting the persisted user. Cart, wishlist and orders
    /// stay in the store for the next sign-in.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.store.remove(keys::USER);
    }

    fn require_user(&self) -> Result<&User, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// The persisted cart lines, joined against the catalog.
    ///
    /// Lines whose product has left the catalog are dropped, and without a
    /// signed-in user the cart reads as empty.
    #[must_use]
    pub fn cart(&self) -> Vec<CartLine> {
        if self.user.is_none() {
            return Vec::new();
        }

        let lines: Vec<CartLine> = storage::load(&self.store, keys::CART);

        lines
            .into_iter()
            .filter(|line| self.catalog.find_by_id(&line.product_id).is_some())
            .collect()
    }

    /// Add a product variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, any
    /// [`CartError`] from the underlying cart rules, or a [`StorageError`]
    /// if the cart cannot be persisted.
    pub fn add_to_cart(
        &mut self,
        product_id: &str,
        quantity: u32,
        size: &str,
        color: &str,
    ) -> Result<(), SessionError> {
        self.require_user()?;

        let mut cart = Cart::from_lines(storage::load(&self.store, keys::CART));
        cart.add_line(self.catalog, product_id, quantity, size, color)?;

        storage::save(&mut self.store, keys::CART, cart.lines())?;
        debug!(product_id, quantity, size, color, "added to cart");

        Ok(())
    }

    /// Replace a line's quantity; zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, or a
    /// [`StorageError`] if the cart cannot be persisted.
    pub fn set_quantity(&mut self, line_id: Uuid, quantity: i64) -> Result<(), SessionError> {
        self.require_user()?;

        let mut cart = Cart::from_lines(storage::load(&self.store, keys::CART));
        cart.set_quantity(line_id, quantity);

        storage::save(&mut self.store, keys::CART, cart.lines())?;

        Ok(())
    }

    /// Remove a line from the cart; unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, or a
    /// [`StorageError`] if the cart cannot be persisted.
    pub fn remove_from_cart(&mut self, line_id: Uuid) -> Result<(), SessionError> {
        self.require_user()?;

        let mut cart = Cart::from_lines(storage::load(&self.store, keys::CART));
        cart.remove_line(line_id);

        storage::save(&mut self.store, keys::CART, cart.lines())?;

        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, or a
    /// [`StorageError`] if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), SessionError> {
        self.require_user()?;

        storage::save::<CartLine, S>(&mut self.store, keys::CART, &[])?;

        Ok(())
    }

    /// The cart subtotal at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if money arithmetic fails.
    pub fn cart_subtotal(&self) -> Result<Money<'static, Currency>, SessionError> {
        let cart = Cart::from_lines(self.cart());

        Ok(cart.subtotal(self.catalog)?)
    }

    /// The wishlisted product ids, pruned to products still in the catalog.
    #[must_use]
    pub fn wishlist(&self) -> Vec<String> {
        if self.user.is_none() {
            return Vec::new();
        }

        let ids: Vec<String> = storage::load(&self.store, keys::WISHLIST);

        ids.into_iter()
            .filter(|id| self.catalog.find_by_id(id).is_some())
            .collect()
    }

    /// Save a product for later; returns `false` when already saved.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, a
    /// [`WishlistError`] for unknown products, or a [`StorageError`] if the
    /// wishlist cannot be persisted.
    pub fn add_to_wishlist(&mut self, product_id: &str) -> Result<bool, SessionError> {
        self.require_user()?;

        let mut wishlist = Wishlist::from_product_ids(storage::load(&self.store, keys::WISHLIST));
        let added = wishlist.add(self.catalog, product_id)?;

        if added {
            storage::save(&mut self.store, keys::WISHLIST, wishlist.product_ids())?;
            debug!(product_id, "added to wishlist");
        }

        Ok(added)
    }

    /// Remove a product from the wishlist; unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, or a
    /// [`StorageError`] if the wishlist cannot be persisted.
    pub fn remove_from_wishlist(&mut self, product_id: &str) -> Result<(), SessionError> {
        self.require_user()?;

        let mut wishlist = Wishlist::from_product_ids(storage::load(&self.store, keys::WISHLIST));
        wishlist.remove(product_id);

        storage::save(&mut self.store, keys::WISHLIST, wishlist.product_ids())?;

        Ok(())
    }

    /// Check whether a product is wishlisted.
    #[must_use]
    pub fn in_wishlist(&self, product_id: &str) -> bool {
        self.wishlist().iter().any(|id| id == product_id)
    }

    /// Validate a coupon code against the current cart subtotal and today's
    /// date, without placing an order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, or the
    /// [`CouponError`] for the first failing validation check.
    pub fn apply_coupon(&self, code: &str) -> Result<AppliedCoupon<'a>, SessionError> {
        self.require_user()?;

        let subtotal = self.cart_subtotal()?;
        let today = Zoned::now().date();

        Ok(self.coupons.validate(code, subtotal, today)?)
    }

    /// Orders placed in this store, most recent first.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        if self.user.is_none() {
            return Vec::new();
        }

        storage::load(&self.store, keys::ORDERS)
    }

    /// Place an order for the current cart contents.
    ///
    /// The coupon, when given, is re-validated here against the freshly
    /// derived subtotal — the session never trusts a caller-supplied
    /// discount. On success the order is prepended to the persisted order
    /// list (most recent first) and the cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] without a user, a
    /// [`CouponError`] if the coupon is rejected, an [`OrderError`] if
    /// assembly fails, or a [`StorageError`] if persistence fails.
    pub fn place_order(
        &mut self,
        shipping_address: ShippingAddress,
        coupon_code: Option<&str>,
    ) -> Result<Order, SessionError> {
        self.require_user()?;

        let lines = self.cart();
        let subtotal = Cart::from_lines(lines.clone()).subtotal(self.catalog)?;

        let (code, discount) = match coupon_code {
            Some(code) => {
                let today = Zoned::now().date();
                let applied = self.coupons.validate(code, subtotal, today)?;

                (Some(applied.coupon.code.clone()), applied.discount)
            }
            None => (None, Money::from_minor(0, self.catalog.currency())),
        };

        let order = orders::create_order(
            self.catalog,
            &lines,
            shipping_address,
            code.as_deref(),
            discount,
        )?;

        let mut all = self.orders();
        all.insert(0, order.clone());

        storage::save(&mut self.store, keys::ORDERS, &all)?;
        storage::save::<CartLine, S>(&mut self.store, keys::CART, &[])?;

        debug!(order_number = %order.order_number, total = order.total, "order placed");

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        catalog::{CatalogError, Product},
        coupons::{Coupon, CouponDiscount},
        storage::MemoryStore,
    };

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            brand: "Nike".to_string(),
            category_id: "1".to_string(),
            category_slug: "men".to_string(),
            sizes: smallvec!["UK 9".to_string()],
            colors: smallvec!["Black".to_string()],
            price: Money::from_major(price, INR),
            original_price: None,
            stock_quantity: 25,
            description: String::new(),
            image_url: String::new(),
            is_featured: false,
        }
    }

    fn test_catalog() -> Result<Catalog, CatalogError> {
        Catalog::new(Vec::new(), vec![product("p1", 8999)], INR)
    }

    fn test_coupons() -> CouponBook {
        CouponBook::new(vec![Coupon {
            id: "c1".to_string(),
            code: "WELCOME10".to_string(),
            discount: CouponDiscount::Percentage(decimal_percentage::Percentage::from(0.10)),
            min_order_value: Money::from_major(1000, INR),
            max_uses: None,
            used_count: 0,
            expires_at: None,
        }])
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Verma".to_string(),
            phone: "9876543210".to_string(),
            address: "14 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            pincode: "560001".to_string(),
        }
    }

    #[test]
    fn mutations_are_rejected_without_a_user() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        let add = session.add_to_cart("p1", 1, "UK 9", "Black");
        let wish = session.add_to_wishlist("p1");
        let order = session.place_order(address(), None);

        assert!(matches!(add, Err(SessionError::NotSignedIn)));
        assert!(matches!(wish, Err(SessionError::NotSignedIn)));
        assert!(matches!(order, Err(SessionError::NotSignedIn)));
        assert!(session.cart().is_empty());
        assert!(session.orders().is_empty());

        Ok(())
    }

    #[test]
    fn cart_mutations_persist_and_read_back() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        session.sign_in("asha@stride.shop", "secret1")?;
        session.add_to_cart("p1", 2, "UK 9", "Black")?;

        let cart = session.cart();

        assert_eq!(cart.len(), 1);
        assert_eq!(session.cart_subtotal()?, Money::from_major(17998, INR));

        Ok(())
    }

    #[test]
    fn place_order_revalidates_the_coupon_and_clears_the_cart() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        session.sign_in("asha@stride.shop", "secret1")?;
        session.add_to_cart("p1", 2, "UK 9", "Black")?;

        let order = session.place_order(address(), Some("welcome10"))?;

        assert_eq!(order.subtotal, 1_799_800);
        assert_eq!(order.discount, 179_980);
        assert_eq!(order.total, 1_619_820);
        assert_eq!(order.coupon_code.as_deref(), Some("WELCOME10"));
        assert!(session.cart().is_empty());
        assert_eq!(session.orders().len(), 1);

        Ok(())
    }

    #[test]
    fn orders_are_listed_most_recent_first() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        session.sign_in("asha@stride.shop", "secret1")?;

        session.add_to_cart("p1", 1, "UK 9", "Black")?;
        let first = session.place_order(address(), None)?;

        session.add_to_cart("p1", 3, "UK 9", "Black")?;
        let second = session.place_order(address(), None)?;

        let numbers: Vec<String> = session
            .orders()
            .into_iter()
            .map(|order| order.order_number)
            .collect();

        assert_eq!(numbers, [second.order_number, first.order_number]);

        Ok(())
    }

    #[test]
    fn sign_out_forgets_the_user_but_keeps_collections() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        session.sign_in("asha@stride.shop", "secret1")?;
        session.add_to_cart("p1", 1, "UK 9", "Black")?;
        session.sign_out();

        // Unauthenticated reads are empty even though the data is still stored.
        assert!(session.cart().is_empty());

        session.sign_in("asha@stride.shop", "secret1")?;

        assert_eq!(session.cart().len(), 1);

        Ok(())
    }

    #[test]
    fn session_restores_a_persisted_user() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();

        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());
        session.sign_in("asha@stride.shop", "secret1")?;

        let store = session.into_store();
        let restored = Session::new(&catalog, &coupons, store);

        assert_eq!(
            restored.user().map(|user| user.email.as_str()),
            Some("asha@stride.shop")
        );

        Ok(())
    }

    #[test]
    fn wishlist_round_trip() -> TestResult {
        let catalog = test_catalog()?;
        let coupons = test_coupons();
        let mut session = Session::new(&catalog, &coupons, MemoryStore::new());

        session.sign_in("asha@stride.shop", "secret1")?;

        assert!(session.add_to_wishlist("p1")?);
        assert!(!session.add_to_wishlist("p1")?);
        assert!(session.in_wishlist("p1"));

        session.remove_from_wishlist("p1")?;

        assert!(session.wishlist().is_empty());

        Ok(())
    }
}
