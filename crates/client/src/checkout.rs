//! Cart checkout.

use rust_decimal::Decimal;
use tradepost_core::{Cart, Contact, DispatchError, DispatchRequest, Storage};

use crate::dispatcher::OrderDispatcher;
use crate::gateway::MessagingGateway;

/// What was ordered, captured before the cart is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub lines: usize,
    pub items: u64,
    pub total: Decimal,
    /// False when the order went out but the cart could not be emptied. The
    /// cart then still holds the sent lines, in memory and in storage alike.
    pub cart_cleared: bool,
}

/// Send the cart as an order confirmation, then clear it.
///
/// The cart is cleared only once the gateway accepted the message. If
/// clearing fails the order still counts as sent; the receipt reports it
/// through `cart_cleared` so the caller can warn before a second checkout.
///
/// # Errors
///
/// Returns the dispatch error; the cart is left untouched.
pub async fn checkout<S, G>(
    cart: &mut Cart<S>,
    dispatcher: &OrderDispatcher<G>,
    contact: Contact,
    message: String,
) -> Result<CheckoutReceipt, DispatchError>
where
    S: Storage,
    G: MessagingGateway,
{
    let mut receipt = CheckoutReceipt {
        lines: cart.len(),
        items: cart.total_items(),
        total: cart.total_price(),
        cart_cleared: false,
    };
    let request = DispatchRequest::Order {
        contact,
        message,
        lines: cart.lines().to_vec(),
    };

    dispatcher.dispatch(&request).await?;

    match cart.clear() {
        Ok(()) => receipt.cart_cleared = true,
        Err(e) => tracing::error!(error = %e, "Order sent but the cart could not be cleared"),
    }
    Ok(receipt)
}
