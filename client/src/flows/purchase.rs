//! # Checkout
//!
//! `AttendeeDetails → Payment`. Every selected ticket unit needs an attendee
//! contact before the order can be submitted. Free orders are RSVPs and
//! finish straight from the details step; paid orders open a checkout on the
//! server and hand the result to a [`PaymentGateway`]. A charge the gateway
//! reports as successful is checked against the server before the order
//! completes; ticket issuance itself happens server-side, so completion only
//! refreshes cached state.

use std::future::Future;

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::quantity::TicketSelector;
use super::{to_api_error, FieldError};
use crate::models::{
    AttendeeContact, Event, OrderItem, OrderRequest, PaymentInit, PaymentStatus, Ticket,
};
use crate::query::Rave;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::{is_blank, is_valid_email};

/// What the gateway SDK reported back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Success { reference: String },
    Failed(String),
    Cancelled,
}

/// External card-payment provider.
pub trait PaymentGateway {
    fn charge(&self, init: &PaymentInit) -> impl Future<Output = GatewayOutcome> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseStep {
    AttendeeDetails,
    Payment,
    Completed,
}

#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    Rsvped(Vec<Ticket>),
    Paid { reference: String },
}

/// Attendee contact for one ticket unit.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendeeSlot {
    pub ticket_type_id: Uuid,
    pub ticket_type_name: String,
    pub contact: AttendeeContact,
}

#[derive(Debug, Clone)]
pub struct PurchaseFlow {
    event_id: Uuid,
    step: PurchaseStep,
    total: Decimal,
    slots: Vec<AttendeeSlot>,
    errors: Vec<FieldError>,
}

impl PurchaseFlow {
    /// Starts checkout for the current selection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` when nothing is selected
    pub fn start(event: &Event, selector: &TicketSelector) -> ApiResult<Self> {
        if selector.is_empty() {
            return Err(ApiError::validation("Please select at least one ticket"));
        }
        let slots = selector
            .selected()
            .flat_map(|(ticket_type, qty)| {
                (0..qty).map(move |_| AttendeeSlot {
                    ticket_type_id: ticket_type.id,
                    ticket_type_name: ticket_type.name.clone(),
                    contact: AttendeeContact::default(),
                })
            })
            .collect();

        Ok(Self {
            event_id: event.id,
            step: PurchaseStep::AttendeeDetails,
            total: selector.total(),
            slots,
            errors: Vec::new(),
        })
    }

    pub fn step(&self) -> PurchaseStep {
        self.step
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Free orders skip payment entirely.
    pub fn is_rsvp(&self) -> bool {
        self.total.is_zero()
    }

    pub fn slots(&self) -> &[AttendeeSlot] {
        &self.slots
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn set_attendee(&mut self, index: usize, contact: AttendeeContact) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.contact = contact;
                true
            }
            None => false,
        }
    }

    /// Copies one contact onto every ticket, e.g. "use my details for all".
    pub fn fill_all(&mut self, contact: &AttendeeContact) {
        for slot in &mut self.slots {
            slot.contact = contact.clone();
        }
    }

    pub fn validate_attendees(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let field = |name: &str| format!("attendees[{}].{}", i, name);
            let ticket = i + 1;
            if is_blank(&slot.contact.name) {
                errors.push(FieldError::new(
                    field("name"),
                    format!("Ticket {}: attendee name is required", ticket),
                ));
            }
            if !is_valid_email(&slot.contact.email) {
                errors.push(FieldError::new(
                    field("email"),
                    format!("Ticket {}: a valid email is required", ticket),
                ));
            }
            if let Some(phone) = &slot.contact.phone {
                let digits = phone.chars().filter(char::is_ascii_digit).count();
                if !is_blank(phone) && !(7..=15).contains(&digits) {
                    errors.push(FieldError::new(
                        field("phone"),
                        format!("Ticket {}: phone number looks invalid", ticket),
                    ));
                }
            }
        }
        errors
    }

    /// Back from Payment to the details step; a no-op elsewhere.
    pub fn back(&mut self) -> PurchaseStep {
        if self.step == PurchaseStep::Payment {
            self.step = PurchaseStep::AttendeeDetails;
        }
        self.step
    }

    pub fn order(&self) -> OrderRequest {
        let mut items: Vec<OrderItem> = Vec::new();
        for slot in &self.slots {
            match items.iter_mut().find(|i| i.ticket_type_id == slot.ticket_type_id) {
                Some(item) => {
                    item.quantity += 1;
                    item.attendees.push(slot.contact.clone());
                }
                None => items.push(OrderItem {
                    ticket_type_id: slot.ticket_type_id,
                    quantity: 1,
                    attendees: vec![slot.contact.clone()],
                }),
            }
        }
        OrderRequest {
            event_id: self.event_id,
            items,
        }
    }

    /// Advances the flow as far as it can go.
    ///
    /// From the details step this validates attendees, then either RSVPs
    /// (free) or moves to Payment and charges. From Payment it retries the
    /// charge. Failures leave the flow on the step that failed.
    pub async fn submit<G>(&mut self, rave: &Rave, gateway: &G) -> ApiResult<PurchaseOutcome>
    where
        G: PaymentGateway,
    {
        match self.step {
            PurchaseStep::AttendeeDetails => {
                let errors = self.validate_attendees();
                if !errors.is_empty() {
                    let err = to_api_error(&errors);
                    self.errors = errors;
                    rave.notify_error(&err);
                    return Err(err);
                }
                self.errors.clear();

                if self.is_rsvp() {
                    let tickets = rave.rsvp(&self.order()).await?;
                    self.step = PurchaseStep::Completed;
                    info!(event_id = %self.event_id, count = tickets.len(), "RSVP confirmed");
                    return Ok(PurchaseOutcome::Rsvped(tickets));
                }

                self.step = PurchaseStep::Payment;
                self.pay(rave, gateway).await
            }
            PurchaseStep::Payment => self.pay(rave, gateway).await,
            PurchaseStep::Completed => Err(ApiError::validation(
                "This order has already been completed",
            )),
        }
    }

    async fn pay<G>(&mut self, rave: &Rave, gateway: &G) -> ApiResult<PurchaseOutcome>
    where
        G: PaymentGateway,
    {
        let init = rave.initialize_payment(&self.order()).await?;
        debug!(reference = %init.reference, amount = %init.amount, "Opening payment gateway");

        match gateway.charge(&init).await {
            GatewayOutcome::Success { reference } => {
                let verification = rave.verify_payment(&reference).await?;
                let unsettled = match verification.status {
                    PaymentStatus::Success => None,
                    PaymentStatus::Pending => {
                        Some("the charge is still pending, check your tickets shortly")
                    }
                    PaymentStatus::Failed | PaymentStatus::Abandoned => {
                        Some("the charge was not completed")
                    }
                };
                if let Some(message) = unsettled {
                    let err = ApiError::Payment(message.to_string());
                    rave.notify_error(&err);
                    return Err(err);
                }

                self.step = PurchaseStep::Completed;
                rave.payment_completed(self.event_id);
                info!(event_id = %self.event_id, %reference, "Payment confirmed by gateway");
                Ok(PurchaseOutcome::Paid { reference })
            }
            GatewayOutcome::Failed(message) => {
                let err = ApiError::Payment(message);
                rave.notify_error(&err);
                Err(err)
            }
            GatewayOutcome::Cancelled => {
                let err = ApiError::Payment("Payment was cancelled".to_string());
                rave.notify_error(&err);
                Err(err)
            }
        }
    }
}
