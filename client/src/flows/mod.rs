//! Multi-step flows: the event create/edit wizard, ticket quantity
//! selection and checkout.

pub mod event_form;
pub mod purchase;
pub mod quantity;

use std::fmt;

use crate::utils::error::ApiError;

pub use event_form::{EventForm, EventStep, EventWizard, TicketTypeDraft};
pub use purchase::{GatewayOutcome, PaymentGateway, PurchaseFlow, PurchaseOutcome, PurchaseStep};
pub use quantity::{StockBadge, TicketSelector};

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collapses field errors into the single message surfaced to the user.
pub(crate) fn to_api_error(errors: &[FieldError]) -> ApiError {
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    ApiError::Validation(message)
}
