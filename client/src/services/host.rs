//! Host dashboard: analytics, attendees, check-in and payouts

use uuid::Uuid;

use crate::api::ApiClient;
use crate::models::host::CheckInRequest;
use crate::models::{Attendee, CheckInResult, HostAnalytics, Payout, PayoutAccount};
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::is_blank;

pub async fn analytics(client: &ApiClient) -> ApiResult<HostAnalytics> {
    client.get("/host/analytics").await
}

pub async fn attendees(client: &ApiClient, event_id: Uuid) -> ApiResult<Vec<Attendee>> {
    client
        .get(&format!("/host/events/{}/attendees", event_id))
        .await
}

/// Checks a ticket in by the payload scanned from its QR code.
pub async fn check_in(client: &ApiClient, qr_code: &str) -> ApiResult<CheckInResult> {
    if is_blank(qr_code) {
        return Err(ApiError::validation("Scanned QR code is empty"));
    }
    let body = CheckInRequest {
        qr_code: qr_code.trim().to_string(),
    };
    client.post("/host/check-in", &body).await
}

pub async fn payouts(client: &ApiClient) -> ApiResult<Vec<Payout>> {
    client.get("/host/payouts").await
}

pub async fn payout_account(client: &ApiClient) -> ApiResult<Option<PayoutAccount>> {
    client.get("/host/payout-account").await
}

pub async fn update_payout_account(
    client: &ApiClient,
    account: &PayoutAccount,
) -> ApiResult<PayoutAccount> {
    check_payout_account(account)?;
    client.put("/host/payout-account", account).await
}

fn check_payout_account(account: &PayoutAccount) -> ApiResult<()> {
    if is_blank(&account.bank_name) || is_blank(&account.account_name) {
        return Err(ApiError::validation("Bank and account name are required"));
    }
    let digits = account.account_number.trim();
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation("Account number must be 10 digits"));
    }
    Ok(())
}
