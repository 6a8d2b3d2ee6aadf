use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Host-side view of a purchased ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub ticket_id: Uuid,
    pub name: String,
    pub email: String,
    pub ticket_type_name: String,
    pub quantity: u32,
    pub amount: Decimal,
    #[serde(default)]
    pub checked_in: bool,
    #[serde(default)]
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl Attendee {
    /// Case-insensitive match on name or email, as used by the attendee search box.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub qr_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub attendee: Attendee,
    /// True when the ticket had already been scanned before this call.
    #[serde(default)]
    pub already_checked_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSales {
    pub event_id: Uuid,
    pub title: String,
    pub tickets_sold: u32,
    pub revenue: Decimal,
    #[serde(default)]
    pub checked_in: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostAnalytics {
    pub total_events: u32,
    pub tickets_sold: u32,
    pub total_revenue: Decimal,
    pub total_attendees: u32,
    #[serde(default)]
    pub checked_in: u32,
    #[serde(default)]
    pub events: Vec<EventSales>,
}

impl HostAnalytics {
    /// Share of attendees that have checked in, in percent.
    pub fn check_in_rate(&self) -> f64 {
        if self.total_attendees == 0 {
            0.0
        } else {
            f64::from(self.checked_in) * 100.0 / f64::from(self.total_attendees)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutAccount {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendee_search() {
        let attendee = Attendee {
            ticket_id: Uuid::new_v4(),
            name: "Tunde Bello".to_string(),
            email: "tunde@example.com".to_string(),
            ticket_type_name: "VIP".to_string(),
            quantity: 1,
            amount: Decimal::new(10000, 0),
            checked_in: false,
            checked_in_at: None,
        };
        assert!(attendee.matches("bello"));
        assert!(attendee.matches("EXAMPLE.COM"));
        assert!(attendee.matches("  "));
        assert!(!attendee.matches("ada"));
    }

    #[test]
    fn test_check_in_rate() {
        let analytics: HostAnalytics = serde_json::from_value(serde_json::json!({
            "totalEvents": 2,
            "ticketsSold": 40,
            "totalRevenue": "120000.00",
            "totalAttendees": 40,
            "checkedIn": 10
        }))
        .unwrap();
        assert_eq!(analytics.check_in_rate(), 25.0);
        assert!(analytics.events.is_empty());
    }
}
