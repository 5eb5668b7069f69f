//! Plain-text receipts.

use std::fmt::Write;

use brightwire_core::types::format_money;
use brightwire_core::{Customer, Order};
use rust_decimal::Decimal;

/// Name printed at the top of every receipt.
pub const STORE_NAME: &str = "Brightwire";

const WIDTH: usize = 56;

/// Render the receipt for a placed order.
#[must_use]
pub fn render_receipt(order: &Order, customer: &Customer) -> String {
    let rule = "=".repeat(WIDTH);
    let thin_rule = "-".repeat(WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:^WIDTH$}", format!("{STORE_NAME} Receipt"));
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Order:    {}", order.id);
    let _ = writeln!(out, "Date:     {}", order.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Customer: {} <{}>", customer.name, customer.email);
    let _ = writeln!(out, "Payment:  {}", order.payment_method.label());
    let _ = writeln!(out, "{thin_rule}");

    for item in &order.items {
        let _ = writeln!(out, "{}", item.title);
        let _ = writeln!(
            out,
            "  {} x {:>12} {:>WIDTH_AMOUNT$}",
            item.quantity,
            item.price.to_string(),
            format_money(item.line_total()),
            WIDTH_AMOUNT = WIDTH - 20,
        );
    }

    let _ = writeln!(out, "{thin_rule}");
    write_total(&mut out, "Subtotal", order.subtotal);
    write_total(
        &mut out,
        &format!("Tax ({}%)", percent(order.tax_rate)),
        order.tax,
    );
    write_total(&mut out, "Total", order.total);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Thank you for your purchase!");

    out
}

fn write_total(out: &mut String, label: &str, amount: Decimal) {
    let _ = writeln!(out, "{label:<20}{:>width$}", format_money(amount), width = WIDTH - 20);
}

/// A fractional rate as a percentage without trailing zeros, e.g. `0.23` as `23`.
fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}
