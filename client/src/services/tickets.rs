//! Ticket ownership, RSVP and checkout

use uuid::Uuid;

use crate::api::ApiClient;
use crate::models::{OrderRequest, PaymentInit, PaymentVerification, Ticket};
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::is_blank;

pub async fn mine(client: &ApiClient) -> ApiResult<Vec<Ticket>> {
    client.get("/tickets").await
}

pub async fn get(client: &ApiClient, id: Uuid) -> ApiResult<Ticket> {
    client.get(&format!("/tickets/{}", id)).await
}

/// Registers for a free event; tickets are issued immediately.
pub async fn rsvp(client: &ApiClient, order: &OrderRequest) -> ApiResult<Vec<Ticket>> {
    client.post("/tickets/rsvp", order).await
}

/// Opens a paid checkout. Tickets are issued by the server once the gateway
/// confirms the charge.
pub async fn initialize_payment(client: &ApiClient, order: &OrderRequest) -> ApiResult<PaymentInit> {
    client.post("/payments/initialize", order).await
}

pub async fn verify_payment(client: &ApiClient, reference: &str) -> ApiResult<PaymentVerification> {
    if is_blank(reference) {
        return Err(ApiError::validation("Payment reference is missing"));
    }
    client.get(&format!("/payments/verify/{}", reference)).await
}
