//! Catalog

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors related to catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product's price currency differs from the catalog currency
    /// (product id, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Product category reference data.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Category id
    pub id: String,

    /// Display name
    pub name: String,

    /// URL slug used for category lookups
    pub slug: String,

    /// Short description
    pub description: String,

    /// Image URL
    pub image_url: String,
}

/// Product
#[derive(Debug, Clone)]
pub struct Product {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Brand name
    pub brand: String,

    /// Id of the category this product belongs to
    pub category_id: String,

    /// Slug of the category this product belongs to
    pub category_slug: String,

    /// Ordered size labels the product is sold in
    pub sizes: SmallVec<[String; 5]>,

    /// Ordered colour labels the product is sold in
    pub colors: SmallVec<[String; 5]>,

    /// Current selling price
    pub price: Money<'static, Currency>,

    /// Pre-markdown price, `None` when the product is not marked down
    pub original_price: Option<Money<'static, Currency>>,

    /// Units in stock; zero means the product cannot be added to a cart
    pub stock_quantity: u32,

    /// Long description
    pub description: String,

    /// Image URL
    pub image_url: String,

    /// Whether the product appears in the featured carousel
    pub is_featured: bool,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Check whether `size` is one of this product's size labels.
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Check whether `color` is one of this product's colour labels.
    pub fn has_color(&self, color: &str) -> bool {
        self.colors.iter().any(|c| c == color)
    }

    /// Markdown fraction for display, derived from `original_price` vs `price`.
    ///
    /// Returns `None` when the product has no original price, or when the
    /// original price is not strictly greater than the current price — a
    /// negative markdown is never shown.
    #[must_use]
    pub fn discount_percent(&self) -> Option<Percentage> {
        let original = self.original_price.as_ref()?;

        let original_minor = original.to_minor_units();
        let price_minor = self.price.to_minor_units();

        if original_minor <= price_minor || original_minor == 0 {
            return None;
        }

        let saved = Decimal::from(original_minor - price_minor);
        let base = Decimal::from(original_minor);

        Some(Percentage::from(saved / base))
    }
}

/// The fixed, read-only set of purchasable products and categories.
///
/// Immutable for the process lifetime; every lookup is pure and deterministic.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    currency: &'static Currency,
}

impl Catalog {
    /// Create a new catalog with the given categories and products.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if any product price (or original price) is
    /// denominated in a currency other than the catalog currency.
    pub fn new(
        categories: Vec<Category>,
        products: Vec<Product>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        products.iter().try_for_each(|product| {
            let price_currency = product.price.currency();

            let original_currency = product
                .original_price
                .as_ref()
                .map_or(currency, |original| original.currency());

            if price_currency == currency && original_currency == currency {
                Ok(())
            } else {
                let offending = if price_currency == currency {
                    original_currency
                } else {
                    price_currency
                };

                Err(CatalogError::CurrencyMismatch(
                    product.id.clone(),
                    offending.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Catalog {
            categories,
            products,
            currency,
        })
    }

    /// Look up a product by id. Unknown ids are not an error.
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products in the category with the given slug, insertion order preserved.
    pub fn find_by_category(&self, slug: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category_slug == slug)
            .collect()
    }

    /// Case-insensitive substring search against product name or brand.
    ///
    /// An empty query is not special-cased: it matches every product. Callers
    /// that want different empty-query behaviour must decide before calling.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let query = query.to_lowercase();

        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query) || p.brand.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// All products flagged as featured.
    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_featured).collect()
    }

    /// Look up a category by slug.
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// All categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// All products, insertion order preserved.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Get the currency all catalog prices are denominated in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Get the number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
