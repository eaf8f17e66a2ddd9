//! Checkout Example
//!
//! This example walks a shopper through a full checkout: sign in, fill the
//! cart with the featured products, optionally apply a coupon and place an
//! order, printing the confirmation receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-c` to apply a coupon code at checkout

use std::io;

use anyhow::Result;

use clap::Parser;
use stride::{
    fixtures::Fixture,
    orders::ShippingAddress,
    receipt,
    session::Session,
    storage::MemoryStore,
    utils::DemoArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = DemoArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let (catalog, coupons) = fixture.into_parts();

    let mut session = Session::new(&catalog, &coupons, MemoryStore::new());
    session.sign_in("demo@stride.shop", "demo-password")?;

    for product in catalog.featured() {
        let Some(size) = product.sizes.first() else {
            continue;
        };

        let Some(color) = product.colors.first() else {
            continue;
        };

        session.add_to_cart(&product.id, 1, size, color)?;
        println!("Added {} ({size} / {color})", product.name);
    }

    println!("Cart subtotal: {}", session.cart_subtotal()?);

    let coupon_code = match args.coupon.as_deref() {
        Some(code) => match session.apply_coupon(code) {
            Ok(applied) => {
                println!("Coupon {}: -{}", applied.coupon.code, applied.discount);

                Some(applied.coupon.code.clone())
            }
            Err(rejection) => {
                println!("Coupon rejected: {rejection}");

                None
            }
        },
        None => None,
    };

    let address = ShippingAddress {
        full_name: "Demo Shopper".to_string(),
        phone: "9876543210".to_string(),
        address: "14 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
    };

    let order = session.place_order(address, coupon_code.as_deref())?;

    receipt::write_order(io::stdout().lock(), &order, catalog.currency())?;

    Ok(())
}
