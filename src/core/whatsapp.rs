//! `WhatsApp` deep links for following up on an order.
//!
//! The admin opens `https://wa.me/<number>?text=<message>` to confirm an order with
//! the customer. The message lists every line with its exact line total.

use crate::{
    config::store::StoreConfig,
    core::money::{format_cents, line_total_cents, parse_price_cents},
    entities::OrderModel,
};
use std::fmt::Write as _;

/// Turns a phone number as typed by a customer into international digits.
///
/// Non-digits are stripped. A number that already starts with `country_code` is
/// kept as is; otherwise one leading `0` is dropped and the code is prepended.
#[must_use]
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(country_code) {
        return digits;
    }
    let local = digits.strip_prefix('0').unwrap_or(&digits);
    format!("{country_code}{local}")
}

fn line_total(price: &str, quantity: u32) -> String {
    // Lines come from a validated cart; an unparseable legacy price shows as 0.00
    let unit = parse_price_cents(price).unwrap_or_default();
    format_cents(line_total_cents(unit, quantity))
}

/// Builds the confirmation message sent to the customer.
#[must_use]
pub fn compose_order_message(order: &OrderModel, restaurant_name: &str) -> String {
    let items = order
        .items
        .0
        .iter()
        .map(|line| {
            format!(
                "  - {} x{} — ${}",
                line.name,
                line.quantity,
                line_total(&line.price, line.quantity)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut message = format!("Hola {}!\n", order.customer_name);
    let _ = write!(message, "Soy de *{restaurant_name}*\n\n");
    let _ = write!(
        message,
        "Tu pedido *#{}* ha sido recibido:\n\n",
        order.order_number
    );
    message.push_str("*Detalle:*\n");
    message.push_str(&items);
    message.push_str("\n\n");
    let _ = writeln!(message, "*Total: ${}*", format_cents(order.total_cents));
    if !order.notes.is_empty() {
        let _ = write!(message, "\nNotas: {}\n", order.notes);
    }
    message.push_str(
        "\nPara coordinar el envio, por favor comparte tu ubicacion de WhatsApp o escribenos tu direccion exacta.\n",
    );
    message.push_str("Gracias por tu pedido!");
    message
}

/// Full `wa.me` link for an order.
#[must_use]
pub fn order_link(order: &OrderModel, config: &StoreConfig) -> String {
    let number = normalize_phone(&order.customer_phone, &config.whatsapp.country_code);
    let message = compose_order_message(order, &config.store.display_name);
    format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(&message)
    )
}
