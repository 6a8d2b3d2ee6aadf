//! Saved events

use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::models::Event;
use crate::utils::error::ApiResult;
use crate::utils::validation::parse_event_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistStatus {
    in_wishlist: bool,
}

pub async fn list(client: &ApiClient) -> ApiResult<Vec<Event>> {
    client.get("/wishlist").await
}

pub async fn status(client: &ApiClient, event_id: &str) -> ApiResult<bool> {
    let event_id = parse_event_id(event_id)?;
    let status: WishlistStatus = client
        .get(&format!("/wishlist/{}/status", event_id))
        .await?;
    Ok(status.in_wishlist)
}

pub async fn add(client: &ApiClient, event_id: &str) -> ApiResult<()> {
    let event_id = parse_event_id(event_id)?;
    client
        .post_unit(&format!("/wishlist/{}", event_id), &json!({}))
        .await
}

pub async fn remove(client: &ApiClient, event_id: &str) -> ApiResult<()> {
    let event_id = parse_event_id(event_id)?;
    client.delete(&format!("/wishlist/{}", event_id)).await
}
