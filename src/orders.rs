//! Orders

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{cart::CartLine, catalog::Catalog};

/// Errors raised while assembling an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order must contain at least one line.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// A cart line references a product no longer in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The supplied discount is larger than the re-derived subtotal.
    #[error("Discount exceeds the order subtotal")]
    DiscountExceedsSubtotal,

    /// The shipping address failed validation.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Address validation failures, surfaced to the shopper verbatim.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// One or more required fields are blank.
    #[error("Please fill all address fields")]
    MissingField,

    /// Phone numbers must be at least ten characters.
    #[error("Please enter a valid phone number")]
    InvalidPhone,

    /// Pincodes must be at least six characters.
    #[error("Please enter a valid pincode")]
    InvalidPincode,
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// State
    pub state: String,

    /// Postal code
    pub pincode: String,
}

impl ShippingAddress {
    /// Check the address is complete enough to ship to.
    ///
    /// # Errors
    ///
    /// - [`AddressError::MissingField`]: any field is blank.
    /// - [`AddressError::InvalidPhone`]: the phone number is shorter than ten characters.
    /// - [`AddressError::InvalidPincode`]: the pincode is shorter than six characters.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required = [
            &self.full_name,
            &self.phone,
            &self.address,
            &self.city,
            &self.state,
            &self.pincode,
        ];

        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(AddressError::MissingField);
        }

        if self.phone.chars().count() < 10 {
            return Err(AddressError::InvalidPhone);
        }

        if self.pincode.chars().count() < 6 {
            return Err(AddressError::InvalidPincode);
        }

        Ok(())
    }
}

/// Order lifecycle states.
///
/// New orders start as `Placed`. No transition functions are modelled here;
/// moving an order forward (or cancelling it) is an administrative action
/// outside this crate's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order accepted, not yet shipped.
    Placed,

    /// Order handed to the carrier.
    Shipped,

    /// Order received by the shopper.
    Delivered,

    /// Order cancelled.
    Cancelled,
}

/// Immutable snapshot of one cart line at order time.
///
/// Captures name, image and unit price by value so later catalog changes can
/// never mutate historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Item id
    pub id: Uuid,

    /// Id of the product this item snapshotted.
    pub product_id: String,

    /// Product name at order time.
    pub product_name: String,

    /// Product image URL at order time.
    pub product_image: String,

    /// Units ordered.
    pub quantity: u32,

    /// Unit price in minor units at order time.
    pub price: i64,

    /// Chosen size label.
    pub size: String,

    /// Chosen colour label.
    pub color: String,
}

/// A placed order.
///
/// Monetary fields are minor units in the catalog currency. Invariants held
/// at assembly: `total == subtotal - discount` and `discount <= subtotal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    pub id: Uuid,

    /// Human-readable order number, e.g. `STRMF04K2QX`.
    pub order_number: String,

    /// Lifecycle state, `Placed` on creation.
    pub status: OrderStatus,

    /// Sum of `price * quantity` over the snapshotted items, minor units.
    pub subtotal: i64,

    /// Discount applied at checkout, minor units.
    pub discount: i64,

    /// Amount charged: `subtotal - discount`, minor units.
    pub total: i64,

    /// Uppercase coupon code, if one was applied.
    pub coupon_code: Option<String>,

    /// Where the order ships to.
    pub shipping_address: ShippingAddress,

    /// When the order was placed.
    pub created_at: Timestamp,

    /// Snapshot of the cart at order time; owned by the order, never shared.
    pub items: Vec<OrderItem>,
}

/// Assemble an immutable order from the given cart lines.
///
/// The subtotal is re-derived from current catalog prices rather than trusted
/// from the caller, so assembler output always agrees with the cart pricing
/// rule. The `discount` is taken verbatim apart from an upper-bound check;
/// callers that want it re-validated against the fresh subtotal should go
/// through [`crate::session::Session::place_order`].
///
/// # Errors
///
/// - [`OrderError::EmptyCart`]: `lines` is empty.
/// - [`OrderError::Address`]: the shipping address failed validation.
/// - [`OrderError::ProductNotFound`]: a line references a product no longer
///   in the catalog.
/// - [`OrderError::DiscountExceedsSubtotal`]: `discount` is larger than the
///   re-derived subtotal.
/// - [`OrderError::Money`]: money arithmetic failed.
pub fn create_order(
    catalog: &Catalog,
    lines: &[CartLine],
    shipping_address: ShippingAddress,
    coupon_code: Option<&str>,
    discount: Money<'static, Currency>,
) -> Result<Order, OrderError> {
    if lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    shipping_address.validate()?;

    let mut subtotal = Money::from_minor(0, catalog.currency());
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let product = catalog
            .find_by_id(&line.product_id)
            .ok_or_else(|| OrderError::ProductNotFound(line.product_id.clone()))?;

        let unit_minor = product.price.to_minor_units();
        let line_minor = unit_minor * i64::from(line.quantity);

        subtotal = subtotal.add(Money::from_minor(line_minor, catalog.currency()))?;

        items.push(OrderItem {
            id: Uuid::now_v7(),
            product_id: line.product_id.clone(),
            product_name: product.name.clone(),
            product_image: product.image_url.clone(),
            quantity: line.quantity,
            price: unit_minor,
            size: line.size.clone(),
            color: line.color.clone(),
        });
    }

    let subtotal_minor = subtotal.to_minor_units();
    let discount_minor = discount.to_minor_units();

    if discount_minor > subtotal_minor {
        return Err(OrderError::DiscountExceedsSubtotal);
    }

    let created_at = Timestamp::now();

    Ok(Order {
        id: Uuid::now_v7(),
        order_number: order_number(created_at),
        status: OrderStatus::Placed,
        subtotal: subtotal_minor,
        discount: discount_minor,
        total: subtotal_minor - discount_minor,
        coupon_code: coupon_code.map(str::to_uppercase),
        shipping_address,
        created_at,
        items,
    })
}

/// Human-readable order number: `STR` followed by the creation time's
/// millisecond count encoded in uppercase base 36.
///
/// Time-derived, so uniqueness is only probabilistic: two orders created on
/// the exact same millisecond tick would share a number. Acceptable for a
/// single-shopper session; the `id` field stays unique regardless.
fn order_number(created_at: Timestamp) -> String {
    format!("STR{}", base36_upper(created_at.as_millisecond()))
}

fn base36_upper(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut value = u64::try_from(value).unwrap_or(0);

    if value == 0 {
        return "0".to_string();
    }

    let mut encoded = Vec::new();

    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or(0);
        encoded.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        value /= 36;
    }

    encoded.reverse();

    String::from_utf8(encoded).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::catalog::{CatalogError, Product};

    use super::*;

    fn product(id: &str, name: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            brand: "Nike".to_string(),
            category_id: "1".to_string(),
            category_slug: "men".to_string(),
            sizes: smallvec!["UK 9".to_string()],
            colors: smallvec!["Black".to_string()],
            price: Money::from_major(price, INR),
            original_price: None,
            stock_quantity: 25,
            description: String::new(),
            image_url: format!("https://img.example/{id}.jpg"),
            is_featured: false,
        }
    }

    fn test_catalog() -> Result<Catalog, CatalogError> {
        Catalog::new(
            Vec::new(),
            vec![product("p1", "Air Max Pro Runner", 8999)],
            INR,
        )
    }

    fn line(product_id: &str, quantity: u32) -> CartLine {
        CartLine {
            id: Uuid::now_v7(),
            product_id: product_id.to_string(),
            quantity,
            size: "UK 9".to_string(),
            color: "Black".to_string(),
        }
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
    fn create_order_re_derives_subtotal_and_totals() -> TestResult {
        let catalog = test_catalog()?;

        let order = create_order(
            &catalog,
            &[line("p1", 2)],
            address(),
            Some("WELCOME10"),
            Money::from_minor(179_980, INR),
        )?;

        assert_eq!(order.subtotal, 1_799_800);
        assert_eq!(order.discount, 179_980);
        assert_eq!(order.total, 1_619_820);
        assert_eq!(order.total, order.subtotal - order.discount);
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.coupon_code.as_deref(), Some("WELCOME10"));

        Ok(())
    }

    #[test]
    fn create_order_snapshots_line_details() -> TestResult {
        let catalog = test_catalog()?;

        let order = create_order(
            &catalog,
            &[line("p1", 2)],
            address(),
            None,
            Money::from_minor(0, INR),
        )?;

        let Some(item) = order.items.first() else {
            panic!("order has no items");
        };

        assert_eq!(item.product_name, "Air Max Pro Runner");
        assert_eq!(item.product_image, "https://img.example/p1.jpg");
        assert_eq!(item.price, 899_900);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.size, "UK 9");
        assert_eq!(item.color, "Black");

        Ok(())
    }

    #[test]
    fn create_order_rejects_empty_cart() -> TestResult {
        let catalog = test_catalog()?;

        let result = create_order(&catalog, &[], address(), None, Money::from_minor(0, INR));

        assert!(matches!(result, Err(OrderError::EmptyCart)));

        Ok(())
    }

    #[test]
    fn create_order_rejects_unknown_product() -> TestResult {
        let catalog = test_catalog()?;

        let result = create_order(
            &catalog,
            &[line("p404", 1)],
            address(),
            None,
            Money::from_minor(0, INR),
        );

        assert!(matches!(result, Err(OrderError::ProductNotFound(id)) if id == "p404"));

        Ok(())
    }

    #[test]
    fn create_order_rejects_discount_exceeding_subtotal() -> TestResult {
        let catalog = test_catalog()?;

        let result = create_order(
            &catalog,
            &[line("p1", 1)],
            address(),
            None,
            Money::from_major(10_000, INR),
        );

        assert!(matches!(result, Err(OrderError::DiscountExceedsSubtotal)));

        Ok(())
    }

    #[test]
    fn create_order_uppercases_the_coupon_code() -> TestResult {
        let catalog = test_catalog()?;

        let order = create_order(
            &catalog,
            &[line("p1", 1)],
            address(),
            Some("welcome10"),
            Money::from_minor(0, INR),
        )?;

        assert_eq!(order.coupon_code.as_deref(), Some("WELCOME10"));

        Ok(())
    }

    #[test]
    fn order_number_has_the_str_prefix_and_base36_payload() -> TestResult {
        let catalog = test_catalog()?;

        let order = create_order(
            &catalog,
            &[line("p1", 1)],
            address(),
            None,
            Money::from_minor(0, INR),
        )?;

        let Some(payload) = order.order_number.strip_prefix("STR") else {
            panic!("missing STR prefix in {}", order.order_number);
        };

        assert!(!payload.is_empty(), "order number payload must not be empty");
        assert!(
            payload.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "payload must be uppercase base 36"
        );

        Ok(())
    }

    #[test]
    fn base36_round_trips_known_values() {
        assert_eq!(base36_upper(0), "0");
        assert_eq!(base36_upper(35), "Z");
        assert_eq!(base36_upper(36), "10");
        assert_eq!(base36_upper(1_767_139_200_000), "MJT91XC0");
    }

    #[test]
    fn address_validation_rules() {
        let valid = address();
        assert_eq!(valid.validate(), Ok(()));

        let mut blank = address();
        blank.city = "  ".to_string();
        assert_eq!(blank.validate(), Err(AddressError::MissingField));

        let mut short_phone = address();
        short_phone.phone = "12345".to_string();
        assert_eq!(short_phone.validate(), Err(AddressError::InvalidPhone));

        let mut short_pincode = address();
        short_pincode.pincode = "5600".to_string();
        assert_eq!(short_pincode.validate(), Err(AddressError::InvalidPincode));
    }
}
