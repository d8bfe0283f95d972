//! Outbound message composition.
//!
//! A [`DispatchRequest`] is validated and rendered into an [`OrderMessage`]
//! before anything touches the network, so a malformed request never costs
//! a gateway call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartLine;
use crate::phone::{CountryCode, normalize_phone};

/// A dispatch request that cannot be sent as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The sender name is blank.
    #[error("name is required")]
    MissingName,
    /// The free-text message is blank.
    #[error("message is required")]
    MissingMessage,
    /// An order needs the customer's phone number.
    #[error("phone number is required")]
    MissingPhone,
    /// An order needs at least one cart line.
    #[error("cart is empty")]
    EmptyCart,
    /// Inquiries go to the store, whose number is not configured.
    #[error("store phone number is not configured")]
    MissingStorePhone,
}

/// Who a dispatch is from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name, interpolated into the message.
    pub name: String,
    /// Phone number as typed by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Email address, used as a reply-to on inquiries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// What is being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchRequest {
    /// Checkout: a confirmation with the cart contents, sent to the customer.
    Order {
        /// Customer details.
        contact: Contact,
        /// Free-text note, embedded verbatim.
        message: String,
        /// Cart lines at the time of checkout.
        lines: Vec<CartLine>,
    },
    /// Contact form: a message relayed to the store.
    Inquiry {
        /// Sender details.
        contact: Contact,
        /// Free-text message, embedded verbatim.
        message: String,
    },
}

impl DispatchRequest {
    /// Sender details.
    #[must_use]
    pub const fn contact(&self) -> &Contact {
        match self {
            Self::Order { contact, .. } | Self::Inquiry { contact, .. } => contact,
        }
    }

    /// Whether this request carries cart contents.
    #[must_use]
    pub const fn is_order(&self) -> bool {
        matches!(self, Self::Order { .. })
    }
}

/// A rendered message, ready for the gateway.
///
/// Serializes to the gateway's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMessage {
    /// Normalized destination number.
    #[serde(rename = "phone")]
    pub recipient_phone: String,
    /// Rendered body.
    #[serde(rename = "message")]
    pub body: String,
    /// Where replies should go, if not the sender of record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Renders dispatch requests using store-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageComposer {
    country_code: CountryCode,
    currency_symbol: String,
    store_phone: Option<String>,
}

impl MessageComposer {
    /// Create a composer without a store phone; inquiries will be refused.
    #[must_use]
    pub fn new(country_code: CountryCode, currency_symbol: impl Into<String>) -> Self {
        Self {
            country_code,
            currency_symbol: currency_symbol.into(),
            store_phone: None,
        }
    }

    /// Set the number inquiries are delivered to.
    #[must_use]
    pub fn with_store_phone(mut self, phone: impl Into<String>) -> Self {
        let phone = phone.into();
        self.store_phone = (!phone.trim().is_empty()).then_some(phone);
        self
    }

    /// The configured country code.
    #[must_use]
    pub const fn country_code(&self) -> &CountryCode {
        &self.country_code
    }

    /// The store number in normalized form, if configured.
    #[must_use]
    pub fn store_phone(&self) -> Option<String> {
        self.store_phone
            .as_deref()
            .map(|p| normalize_phone(p, &self.country_code))
    }

    /// Check that a request has everything it needs to be sent.
    ///
    /// # Errors
    ///
    /// Returns the first missing piece.
    pub fn validate(&self, request: &DispatchRequest) -> Result<(), ValidationError> {
        let (contact, message) = match request {
            DispatchRequest::Order {
                contact, message, ..
            }
            | DispatchRequest::Inquiry { contact, message } => (contact, message),
        };

        if contact.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if message.trim().is_empty() {
            return Err(ValidationError::MissingMessage);
        }

        match request {
            DispatchRequest::Order { lines, .. } => {
                if non_blank(contact.phone.as_deref()).is_none() {
                    return Err(ValidationError::MissingPhone);
                }
                if lines.iter().all(|l| l.quantity == 0) {
                    return Err(ValidationError::EmptyCart);
                }
            }
            DispatchRequest::Inquiry { .. } => {
                if self.store_phone.is_none() {
                    return Err(ValidationError::MissingStorePhone);
                }
            }
        }
        Ok(())
    }

    /// Validate and render a request.
    ///
    /// Orders go to the customer's normalized phone. Inquiries go to the
    /// store with the sender's email (or phone) as reply-to.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the request is incomplete.
    pub fn build(&self, request: &DispatchRequest) -> Result<OrderMessage, ValidationError> {
        self.validate(request)?;

        match request {
            DispatchRequest::Order {
                contact,
                message,
                lines,
            } => {
                let phone =
                    non_blank(contact.phone.as_deref()).ok_or(ValidationError::MissingPhone)?;
                Ok(OrderMessage {
                    recipient_phone: normalize_phone(phone, &self.country_code),
                    body: self.order_body(contact, message, lines),
                    reply_to: None,
                })
            }
            DispatchRequest::Inquiry { contact, message } => {
                let store = self.store_phone().ok_or(ValidationError::MissingStorePhone)?;
                let reply_to = non_blank(contact.email.as_deref())
                    .map(str::to_string)
                    .or_else(|| {
                        non_blank(contact.phone.as_deref())
                            .map(|p| normalize_phone(p, &self.country_code))
                    });
                Ok(OrderMessage {
                    recipient_phone: store,
                    body: self.inquiry_body(contact, message),
                    reply_to,
                })
            }
        }
    }

    fn money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }

    fn order_body(&self, contact: &Contact, message: &str, lines: &[CartLine]) -> String {
        let mut body = format!(
            "Hi {}, thank you for your order!\n\n{message}\n\nOrder summary:\n",
            contact.name.trim()
        );
        for line in lines.iter().filter(|l| l.quantity > 0) {
            body.push_str(&format!(
                "- {} x {} @ {} = {}\n",
                line.quantity,
                line.name,
                self.money(line.unit_price),
                self.money(line.line_total())
            ));
        }
        let total: Decimal = lines.iter().map(CartLine::line_total).sum();
        body.push_str(&format!("\nTotal: {}", self.money(total)));
        body
    }

    fn inquiry_body(&self, contact: &Contact, message: &str) -> String {
        let mut body = format!("New inquiry from {}\n", contact.name.trim());
        if let Some(phone) = non_blank(contact.phone.as_deref()) {
            body.push_str(&format!(
                "Phone: {}\n",
                normalize_phone(phone, &self.country_code)
            ));
        }
        if let Some(email) = non_blank(contact.email.as_deref()) {
            body.push_str(&format!("Email: {email}\n"));
        }
        body.push('\n');
        body.push_str(message);
        body
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
