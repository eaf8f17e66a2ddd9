//! Utils

use clap::Parser;

/// Arguments for the storefront examples
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to use for the catalog & coupons
    #[clap(short, long, default_value = "store")]
    pub fixture: String,

    /// Coupon code to apply at checkout
    #[clap(short, long)]
    pub coupon: Option<String>,
}
