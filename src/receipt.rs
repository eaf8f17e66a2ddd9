//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::orders::{Order, OrderItem};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Write an order confirmation to `out` as a table followed by the totals.
///
/// Persisted order amounts are minor units; `currency` says how to render
/// them.
///
/// # Errors
///
/// Returns [`ReceiptError::IO`] if the receipt cannot be written.
pub fn write_order(
    mut out: impl io::Write,
    order: &Order,
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Variant", "Qty", "Unit Price", "Amount"]);

    for item in &order.items {
        builder.push_record(item_row(item, currency));
    }

    write_items_table(&mut out, builder)?;
    write_totals(&mut out, order, currency)?;

    Ok(())
}

fn item_row(item: &OrderItem, currency: &'static Currency) -> [String; 5] {
    let unit_price = Money::from_minor(item.price, currency);
    let amount = Money::from_minor(item.price * i64::from(item.quantity), currency);

    [
        item.product_name.clone(),
        format!("{} / {}", item.size, item.color),
        item.quantity.to_string(),
        format!("{unit_price}"),
        format!("{amount}"),
    ]
}

fn write_items_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_totals(
    out: &mut impl io::Write,
    order: &Order,
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    let subtotal = Money::from_minor(order.subtotal, currency);
    let discount = Money::from_minor(order.discount, currency);
    let total = Money::from_minor(order.total, currency);

    writeln!(out, " Order:    {}", order.order_number).map_err(|_err| ReceiptError::IO)?;
    writeln!(out, " Subtotal: {subtotal}").map_err(|_err| ReceiptError::IO)?;

    if order.discount > 0 {
        let code = order.coupon_code.as_deref().unwrap_or("");

        writeln!(out, " Discount: -{discount} ({code})").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out, " Total:    {total}").map_err(|_err| ReceiptError::IO)?;

    Ok(())
}
