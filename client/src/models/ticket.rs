use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketType {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    pub total_quantity: u32,
    #[serde(default)]
    pub sold_quantity: u32,
}

impl TicketType {
    pub fn remaining(&self) -> u32 {
        self.total_quantity.saturating_sub(self.sold_quantity)
    }

    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining() == 0
    }
}

/// Ticket type as submitted from the event form. `id` is present when editing
/// an existing type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTypeInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub attendee: AttendeeContact,
    pub qr_code: String,
    pub quantity: u32,
    pub purchased_at: DateTime<Utc>,
    #[serde(default)]
    pub checked_in: bool,
}

/// One line of an order: how many of a ticket type, and who each ticket is for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub ticket_type_id: Uuid,
    pub quantity: u32,
    pub attendees: Vec<AttendeeContact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub event_id: Uuid,
    pub items: Vec<OrderItem>,
}
