//! Wishlist

use thiserror::Error;

use crate::catalog::Catalog;

/// Errors from wishlist mutations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// The referenced product is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

/// Product ids a shopper has saved for later.
///
/// Stored as a plain id list; products are joined against the catalog on
/// read, so ids whose product has left the catalog simply stop appearing.
#[derive(Debug, Clone, Default)]
pub struct Wishlist {
    product_ids: Vec<String>,
}

impl Wishlist {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a wishlist from previously persisted product ids.
    #[must_use]
    pub fn from_product_ids(product_ids: Vec<String>) -> Self {
        Wishlist { product_ids }
    }

    /// Consume the wishlist, returning its product ids for persistence.
    #[must_use]
    pub fn into_product_ids(self) -> Vec<String> {
        self.product_ids
    }

    /// The saved product ids, insertion order preserved.
    #[must_use]
    pub fn product_ids(&self) -> &[String] {
        &self.product_ids
    }

    /// Save a product for later.
    ///
    /// Returns `false` (leaving the list unchanged) when the product is
    /// already present; duplicates are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::ProductNotFound`] when the product id is not
    /// in the catalog.
    pub fn add(&mut self, catalog: &Catalog, product_id: &str) -> Result<bool, WishlistError> {
        if catalog.find_by_id(product_id).is_none() {
            return Err(WishlistError::ProductNotFound(product_id.to_string()));
        }

        if self.contains(product_id) {
            return Ok(false);
        }

        self.product_ids.push(product_id.to_string());

        Ok(true)
    }

    /// Remove a product from the wishlist. Unknown ids are a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.product_ids.retain(|id| id != product_id);
    }

    /// Check whether a product is saved.
    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|id| id == product_id)
    }

    /// Get the number of saved products.
    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    /// Check if the wishlist is empty.
    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::catalog::{CatalogError, Product};

    use super::*;

    fn test_catalog() -> Result<Catalog, CatalogError> {
        let product = Product {
            id: "p1".to_string(),
            name: "Air Max Pro Runner".to_string(),
            brand: "Nike".to_string(),
            category_id: "1".to_string(),
            category_slug: "men".to_string(),
            sizes: smallvec!["UK 9".to_string()],
            colors: smallvec!["Black".to_string()],
            price: Money::from_major(8999, iso::INR),
            original_price: None,
            stock_quantity: 25,
            description: String::new(),
            image_url: String::new(),
            is_featured: false,
        };

        Catalog::new(Vec::new(), vec![product], iso::INR)
    }

    #[test]
    fn add_saves_the_product_once() -> TestResult {
        let catalog = test_catalog()?;
        let mut wishlist = Wishlist::new();

        assert!(wishlist.add(&catalog, "p1")?);
        assert!(!wishlist.add(&catalog, "p1")?);
        assert_eq!(wishlist.len(), 1);
        assert!(wishlist.contains("p1"));

        Ok(())
    }

    #[test]
    fn add_unknown_product_errors() -> TestResult {
        let catalog = test_catalog()?;
        let mut wishlist = Wishlist::new();

        let result = wishlist.add(&catalog, "p404");

        assert!(matches!(result, Err(WishlistError::ProductNotFound(id)) if id == "p404"));

        Ok(())
    }

    #[test]
    fn remove_is_idempotent() -> TestResult {
        let catalog = test_catalog()?;
        let mut wishlist = Wishlist::new();

        wishlist.add(&catalog, "p1")?;
        wishlist.remove("p1");
        wishlist.remove("p1");

        assert!(wishlist.is_empty());

        Ok(())
    }
}
