use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Server-issued handle for a card payment. The gateway SDK is driven with
/// these values; ticket issuance happens server-side once the gateway
/// confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInit {
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub public_key: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub reference: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub amount: Option<Decimal>,
}
