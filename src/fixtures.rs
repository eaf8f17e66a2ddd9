//! Fixtures
//!
//! YAML-backed store definitions used by the examples and integration
//! tests. A fixture set is a pair of files under the base path:
//! `catalog/{name}.yml` and `coupons/{name}.yml`.

use std::{fs, path::PathBuf};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError, Category, Product},
    coupons::{Coupon, CouponBook, CouponDiscount},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Category not found
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Catalog construction error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A loaded fixture set: the catalog plus its coupon book.
#[derive(Debug)]
pub struct Fixture {
    catalog: Catalog,
    coupons: CouponBook,
}

impl Fixture {
    /// Load the named fixture set from the default `./fixtures` base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if either file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_at("./fixtures", name)
    }

    /// Load the named fixture set from a custom base path.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if either file cannot be read or parsed.
    pub fn from_set_at(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let base_path = base_path.into();

        let catalog_path = base_path.join("catalog").join(format!("{name}.yml"));
        let catalog_fixture: CatalogFixture =
            serde_norway::from_str(&fs::read_to_string(&catalog_path)?)?;

        let coupons_path = base_path.join("coupons").join(format!("{name}.yml"));
        let coupons_fixture: CouponsFixture =
            serde_norway::from_str(&fs::read_to_string(&coupons_path)?)?;

        let currency = iso::find(&catalog_fixture.currency)
            .ok_or_else(|| FixtureError::UnknownCurrency(catalog_fixture.currency.clone()))?;

        let categories: Vec<Category> = catalog_fixture
            .categories
            .into_iter()
            .map(|category| Category {
                id: category.id,
                name: category.name,
                slug: category.slug,
                description: category.description,
                image_url: category.image_url,
            })
            .collect();

        let products = catalog_fixture
            .products
            .into_iter()
            .map(|product| build_product(product, &categories, currency))
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Catalog::new(categories, products, currency)?;

        let coupons = coupons_fixture
            .coupons
            .into_iter()
            .map(|coupon| build_coupon(coupon, currency))
            .collect();

        Ok(Fixture {
            catalog,
            coupons: CouponBook::new(coupons),
        })
    }

    /// The loaded catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The loaded coupon book.
    #[must_use]
    pub fn coupons(&self) -> &CouponBook {
        &self.coupons
    }

    /// Consume the fixture, returning catalog and coupon book.
    #[must_use]
    pub fn into_parts(self) -> (Catalog, CouponBook) {
        (self.catalog, self.coupons)
    }
}

fn build_product(
    fixture: ProductFixture,
    categories: &[Category],
    currency: &'static Currency,
) -> Result<Product, FixtureError> {
    let category = categories
        .iter()
        .find(|category| category.slug == fixture.category)
        .ok_or_else(|| FixtureError::UnknownCategory(fixture.category.clone()))?;

    Ok(Product {
        id: fixture.id,
        name: fixture.name,
        brand: fixture.brand,
        category_id: category.id.clone(),
        category_slug: category.slug.clone(),
        sizes: fixture.sizes,
        colors: fixture.colors,
        price: Money::from_major(fixture.price, currency),
        original_price: fixture
            .original_price
            .map(|major| Money::from_major(major, currency)),
        stock_quantity: fixture.stock_quantity,
        description: fixture.description,
        image_url: fixture.image_url,
        is_featured: fixture.is_featured,
    })
}

fn build_coupon(fixture: CouponFixture, currency: &'static Currency) -> Coupon {
    let discount = match fixture.discount {
        DiscountFixture::Percentage { value } => {
            CouponDiscount::Percentage(Percentage::from(Decimal::from(value) / Decimal::ONE_HUNDRED))
        }
        DiscountFixture::Flat { value } => CouponDiscount::Flat(Money::from_major(value, currency)),
    };

    Coupon {
        id: fixture.id,
        code: fixture.code,
        discount,
        min_order_value: Money::from_major(fixture.min_order_value, currency),
        max_uses: fixture.max_uses,
        used_count: fixture.used_count,
        expires_at: fixture.expires_at,
    }
}

/// Wrapper for the catalog YAML file
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    /// ISO alpha code for all prices in this file
    currency: String,

    categories: Vec<CategoryFixture>,
    products: Vec<ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct CategoryFixture {
    id: String,
    name: String,
    slug: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    image_url: String,
}

/// Product fixture from YAML; prices are in major units.
#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: String,
    name: String,
    brand: String,

    /// Category slug
    category: String,

    sizes: SmallVec<[String; 5]>,
    colors: SmallVec<[String; 5]>,
    price: i64,

    #[serde(default)]
    original_price: Option<i64>,

    stock_quantity: u32,

    #[serde(default)]
    description: String,

    #[serde(default)]
    image_url: String,

    #[serde(default)]
    is_featured: bool,
}

#[derive(Debug, Deserialize)]
struct CouponsFixture {
    coupons: Vec<CouponFixture>,
}

/// Coupon fixture from YAML; money values are in major units.
#[derive(Debug, Deserialize)]
struct CouponFixture {
    id: String,
    code: String,
    discount: DiscountFixture,
    min_order_value: i64,

    #[serde(default)]
    max_uses: Option<u32>,

    #[serde(default)]
    used_count: u32,

    #[serde(default)]
    expires_at: Option<jiff::civil::Date>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DiscountFixture {
    /// Percentage of the order subtotal, e.g. `value: 10` for 10% off
    Percentage {
        /// Percent points
        value: i64,
    },

    /// Fixed amount off, in major units
    Flat {
        /// Major units
        value: i64,
    },
}
