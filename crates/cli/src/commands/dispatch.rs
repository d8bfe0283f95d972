//! Checkout and inquiry commands.

use tradepost_client::{ClientConfig, HttpGateway, OrderDispatcher, checkout as send_cart};
use tradepost_core::{Contact, DispatchRequest};

use crate::error::CliError;

fn dispatcher(config: &ClientConfig) -> Result<OrderDispatcher<HttpGateway>, CliError> {
    let endpoint = config
        .gateway_url
        .clone()
        .ok_or(CliError::MissingEnvVar("TRADEPOST_GATEWAY_URL"))?;
    let gateway = HttpGateway::new(
        endpoint,
        config.gateway_token.as_ref(),
        config.gateway_timeout,
    )?;
    Ok(OrderDispatcher::new(config.composer(), gateway))
}

/// Send the local cart as an order confirmation and clear it on success.
pub async fn checkout(
    name: String,
    phone: String,
    email: Option<String>,
    message: String,
) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let dispatcher = dispatcher(&config)?;
    let mut cart = super::cart::open(&config)?;

    let contact = Contact {
        name,
        phone: Some(phone),
        email,
    };

    match send_cart(&mut cart, &dispatcher, contact, message).await {
        Ok(receipt) => {
            let total = format!("{}{:.2}", config.currency_symbol, receipt.total);
            tracing::info!(items = receipt.items, %total, "Order sent");
            if !receipt.cart_cleared {
                tracing::warn!("Cart still holds the sent order; clear it before ordering again");
            }
            Ok(())
        }
        Err(e) => Err(CliError::Dispatch(dispatcher.failure_message(&e))),
    }
}

/// Send a contact message to the store.
pub async fn inquiry(
    name: String,
    phone: Option<String>,
    email: Option<String>,
    message: String,
) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    let dispatcher = dispatcher(&config)?;

    let request = DispatchRequest::Inquiry {
        contact: Contact { name, phone, email },
        message,
    };

    dispatcher
        .dispatch(&request)
        .await
        .map_err(|e| CliError::Dispatch(dispatcher.failure_message(&e)))?;

    tracing::info!("Message sent to the store");
    Ok(())
}
