//! Coupons

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Why a coupon was refused.
///
/// The messages are surfaced to the shopper verbatim, so variant order in
/// [`CouponBook::validate`] is part of the contract: the first failing check
/// decides which message the shopper sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// No coupon exists with the given code.
    #[error("Invalid coupon code")]
    UnknownCode,

    /// The coupon's expiry date is strictly before today.
    #[error("Coupon has expired")]
    Expired,

    /// The coupon has been redeemed as many times as allowed.
    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    /// The order subtotal is below the coupon's threshold (major units).
    #[error("Minimum order value is {0}")]
    MinimumOrderValue(Decimal),

    /// Percentage maths could not be represented in minor units.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Discount rule carried by a coupon.
#[derive(Debug, Clone, Copy)]
pub enum CouponDiscount {
    /// Fraction of the order subtotal (e.g. 0.10 for 10% off).
    Percentage(Percentage),

    /// Fixed amount off, applied verbatim.
    Flat(Money<'static, Currency>),
}

/// A reference record describing a discount rule and its usage constraints.
#[derive(Debug, Clone)]
pub struct Coupon {
    /// Coupon id
    pub id: String,

    /// Code the shopper types in, held uppercase for case-insensitive matching.
    pub code: String,

    /// The discount this coupon grants.
    pub discount: CouponDiscount,

    /// Minimum order subtotal before the coupon applies.
    pub min_order_value: Money<'static, Currency>,

    /// Redemption cap; `None` means unlimited.
    pub max_uses: Option<u32>,

    /// Redemptions recorded so far. Read-only here; validation checks it
    /// against `max_uses` but placing an order never increments it.
    pub used_count: u32,

    /// Last valid calendar date; `None` means the coupon never expires.
    pub expires_at: Option<Date>,
}

/// Successful validation: the matched coupon plus the discount it grants.
#[derive(Debug, Clone)]
pub struct AppliedCoupon<'a> {
    /// The matched coupon record.
    pub coupon: &'a Coupon,

    /// Discount amount, already clamped to the order total.
    pub discount: Money<'static, Currency>,
}

/// Read-only collection of coupons, matched by uppercase-normalized code.
#[derive(Debug, Clone, Default)]
pub struct CouponBook {
    coupons: Vec<Coupon>,
}

impl CouponBook {
    /// Create a coupon book, normalizing every code to uppercase.
    #[must_use]
    pub fn new(coupons: Vec<Coupon>) -> Self {
        let coupons = coupons
            .into_iter()
            .map(|coupon| Coupon {
                code: coupon.code.to_uppercase(),
                ..coupon
            })
            .collect();

        CouponBook { coupons }
    }

    /// Look up a coupon by code, case-insensitively.
    pub fn find(&self, code: &str) -> Option<&Coupon> {
        let code = code.to_uppercase();

        self.coupons.iter().find(|coupon| coupon.code == code)
    }

    /// All coupons in the book.
    #[must_use]
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Decide whether `code` applies to an order of `order_total`, and if so
    /// compute the discount it grants.
    ///
    /// Checks run in a fixed order and the first failure wins: unknown code,
    /// expiry (strictly before `today`), usage limit, then minimum order
    /// value. The computed discount is clamped to `order_total` so the order
    /// total can never go negative.
    ///
    /// Pure and deterministic: `today` is a parameter, never read from the
    /// clock, and `used_count` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponError`] for the first check that fails.
    pub fn validate(
        &self,
        code: &str,
        order_total: Money<'static, Currency>,
        today: Date,
    ) -> Result<AppliedCoupon<'_>, CouponError> {
        let coupon = self.find(code).ok_or(CouponError::UnknownCode)?;

        if let Some(expires_at) = coupon.expires_at {
            if expires_at < today {
                return Err(CouponError::Expired);
            }
        }

        if let Some(max_uses) = coupon.max_uses {
            if coupon.used_count >= max_uses {
                return Err(CouponError::UsageLimitReached);
            }
        }

        let total_minor = order_total.to_minor_units();

        if total_minor < coupon.min_order_value.to_minor_units() {
            return Err(CouponError::MinimumOrderValue(
                coupon.min_order_value.amount().normalize(),
            ));
        }

        let discount = match coupon.discount {
            CouponDiscount::Percentage(percent) => {
                let discount_minor = percent_of_minor(percent, total_minor)?;

                Money::from_minor(discount_minor, order_total.currency())
            }
            CouponDiscount::Flat(amount) => amount,
        };

        // Clamp so a flat coupon larger than the order zeroes it out instead
        // of going negative.
        let discount = if discount.to_minor_units() > total_minor {
            order_total
        } else {
            discount
        };

        Ok(AppliedCoupon { coupon, discount })
    }
}

/// Calculate the discount amount in minor units for a percentage of a minor
/// unit amount, rounding midpoint-away-from-zero at minor-unit precision.
fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, CouponError> {
    let applied = percent * Decimal::from(minor);
    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(CouponError::PercentConversion)
}
