//! Cart

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::Catalog;

/// Errors from cart mutations and totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product has no stock and cannot be added.
    #[error("Product is out of stock: {0}")]
    OutOfStock(String),

    /// The chosen size is not offered for this product.
    #[error("Size {size} is not available for product {product_id}")]
    UnknownSize {
        /// Product the size was requested for.
        product_id: String,
        /// The rejected size label.
        size: String,
    },

    /// The chosen colour is not offered for this product.
    #[error("Colour {color} is not available for product {product_id}")]
    UnknownColor {
        /// Product the colour was requested for.
        product_id: String,
        /// The rejected colour label.
        color: String,
    },

    /// Lines must be added with a positive quantity.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One cart entry: a product / size / colour / quantity combination.
///
/// Lines carry no price; the subtotal always uses the current catalog price,
/// so only an order snapshot freezes what the shopper actually paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line id, unique within the cart.
    pub id: Uuid,

    /// Foreign key into the catalog; the line does not own the product.
    pub product_id: String,

    /// Units of the product, always positive.
    pub quantity: u32,

    /// Chosen size label; member of the product's size domain.
    pub size: String,

    /// Chosen colour label; member of the product's colour domain.
    pub color: String,
}

/// Active shopping cart for a single session.
///
/// At most one line exists per `(product_id, size, color)` triple; adding an
/// existing combination increments its quantity instead of duplicating.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from previously persisted lines.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    /// Consume the cart, returning its lines for persistence.
    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// The cart's lines, insertion order preserved.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Add `quantity` units of a product variant to the cart.
    ///
    /// If a line already exists for the same `(product_id, size, color)`
    /// triple its quantity is incremented; otherwise a new line is created
    /// with a fresh time-ordered id. No upper bound is enforced against the
    /// product's stock beyond rejecting products with zero stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`]: the product id is not in the catalog.
    /// - [`CartError::OutOfStock`]: the product has `stock_quantity == 0`.
    /// - [`CartError::UnknownSize`] / [`CartError::UnknownColor`]: the chosen
    ///   variant is outside the product's domains.
    /// - [`CartError::ZeroQuantity`]: `quantity` is zero.
    pub fn add_line(
        &mut self,
        catalog: &Catalog,
        product_id: &str,
        quantity: u32,
        size: &str,
        color: &str,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let product = catalog
            .find_by_id(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;

        if !product.in_stock() {
            return Err(CartError::OutOfStock(product_id.to_string()));
        }

        if !product.has_size(size) {
            return Err(CartError::UnknownSize {
                product_id: product_id.to_string(),
                size: size.to_string(),
            });
        }

        if !product.has_color(color) {
            return Err(CartError::UnknownColor {
                product_id: product_id.to_string(),
                color: color.to_string(),
            });
        }

        let existing = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id && line.size == size && line.color == color);

        if let Some(line) = existing {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine {
                id: Uuid::now_v7(),
                product_id: product_id.to_string(),
                quantity,
                size: size.to_string(),
                color: color.to_string(),
            });
        }

        Ok(())
    }

    /// Replace the quantity stored on a line.
    ///
    /// A quantity of zero or less removes the line entirely; that is policy,
    /// not an error. Unknown line ids are a no-op.
    pub fn set_quantity(&mut self, line_id: Uuid, quantity: i64) {
        if quantity <= 0 {
            self.remove_line(line_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == line_id) {
            line.quantity = quantity;
        }
    }

    /// Remove a line from the cart. Removing a non-existent id is a no-op.
    pub fn remove_line(&mut self, line_id: Uuid) {
        self.lines.retain(|line| line.id != line_id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Calculate the cart subtotal at current catalog prices.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`]: a line references a product no
    ///   longer in the catalog.
    /// - [`CartError::Money`]: money arithmetic failed.
    pub fn subtotal(&self, catalog: &Catalog) -> Result<Money<'static, Currency>, CartError> {
        let mut total = Money::from_minor(0, catalog.currency());

        for line in &self.lines {
            let product = catalog
                .find_by_id(&line.product_id)
                .ok_or_else(|| CartError::ProductNotFound(line.product_id.clone()))?;

            let line_minor = product.price.to_minor_units() * i64::from(line.quantity);

            total = total.add(Money::from_minor(line_minor, catalog.currency()))?;
        }

        Ok(total)
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
