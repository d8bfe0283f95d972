//! Local cart commands.
//!
//! The cart lives in `TRADEPOST_DATA_DIR` and is the same file the
//! checkout command sends.

use rust_decimal::Decimal;
use tradepost_client::{ClientConfig, FileStorage};
use tradepost_core::{Cart, CartLine};

use crate::error::CliError;

/// Open the cart stored in the configured data directory.
pub(crate) fn open(config: &ClientConfig) -> Result<Cart<FileStorage>, CliError> {
    Ok(Cart::load(FileStorage::open(&config.data_dir)?))
}

fn open_configured() -> Result<(ClientConfig, Cart<FileStorage>), CliError> {
    let config = ClientConfig::from_env()?;
    let cart = open(&config)?;
    Ok((config, cart))
}

pub fn add(
    id: String,
    name: String,
    price: Decimal,
    quantity: u32,
    image: Option<String>,
) -> Result<(), CliError> {
    let (config, mut cart) = open_configured()?;

    let mut line = CartLine::new(id, name, price, quantity);
    line.image_ref = image;
    cart.add(line)?;

    print_cart(&config, &cart);
    Ok(())
}

pub fn remove(id: &str) -> Result<(), CliError> {
    let (config, mut cart) = open_configured()?;
    cart.remove(id)?;
    print_cart(&config, &cart);
    Ok(())
}

pub fn set(id: &str, quantity: i64) -> Result<(), CliError> {
    let (config, mut cart) = open_configured()?;
    if cart.get(id).is_none() {
        tracing::warn!(id, "No such line in the cart");
    }
    cart.set_quantity(id, quantity)?;
    print_cart(&config, &cart);
    Ok(())
}

pub fn show() -> Result<(), CliError> {
    let (config, cart) = open_configured()?;
    print_cart(&config, &cart);
    Ok(())
}

pub fn clear() -> Result<(), CliError> {
    let (_, mut cart) = open_configured()?;
    cart.clear()?;
    tracing::info!("Cart cleared");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(config: &ClientConfig, cart: &Cart<FileStorage>) {
    if cart.is_empty() {
        println!("The cart is empty.");
        return;
    }

    let symbol = &config.currency_symbol;
    for line in cart.lines() {
        println!(
            "{:<12}  {:<28}  {:>4} x {symbol}{:.2}  = {symbol}{:.2}",
            line.id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total(),
        );
    }
    println!(
        "{} item(s), total {symbol}{:.2}",
        cart.total_items(),
        cart.total_price()
    );
}
