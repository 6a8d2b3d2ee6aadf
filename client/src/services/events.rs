//! Event discovery and host-side event CRUD

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::{with_deadline, ApiClient};
use crate::models::{Event, EventFilter, EventInput, EventStatus};
use crate::utils::error::{ApiError, ApiResult};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const IMAGE_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

pub async fn list(client: &ApiClient, filter: &EventFilter) -> ApiResult<Vec<Event>> {
    client.get_with_query("/events", filter).await
}

/// Loads one event, giving up after the configured event-load deadline.
pub async fn get(client: &ApiClient, id: Uuid) -> ApiResult<Event> {
    with_deadline(
        client.event_load_timeout(),
        client.get(&format!("/events/{}", id)),
    )
    .await
}

/// Events owned by the logged-in host, drafts included.
pub async fn hosted(client: &ApiClient) -> ApiResult<Vec<Event>> {
    client.get("/host/events").await
}

pub async fn create(client: &ApiClient, input: &EventInput) -> ApiResult<Event> {
    client.post("/events", input).await
}

pub async fn update(client: &ApiClient, id: Uuid, input: &EventInput) -> ApiResult<Event> {
    client.put(&format!("/events/{}", id), input).await
}

pub async fn delete(client: &ApiClient, id: Uuid) -> ApiResult<()> {
    client.delete(&format!("/events/{}", id)).await
}

pub async fn cancel(client: &ApiClient, id: Uuid) -> ApiResult<Event> {
    client
        .patch(
            &format!("/events/{}/status", id),
            &json!({ "status": EventStatus::Cancelled }),
        )
        .await
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    url: String,
}

/// Uploads a banner image and returns its public URL.
pub async fn upload_image(
    client: &ApiClient,
    file_name: &str,
    mime_type: &str,
    bytes: Vec<u8>,
) -> ApiResult<String> {
    check_image(mime_type, bytes.len())?;

    let part = Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime_type)
        .map_err(|e| ApiError::validation(format!("Invalid image type: {}", e)))?;
    let form = Form::new().part("image", part);

    let uploaded: UploadedImage = client.upload("/uploads/image", form).await?;
    Ok(uploaded.url)
}

fn check_image(mime_type: &str, len: usize) -> ApiResult<()> {
    if !IMAGE_MIME_TYPES.contains(&mime_type) {
        return Err(ApiError::validation(
            "Banner must be a JPEG, PNG, WebP or GIF image",
        ));
    }
    if len == 0 {
        return Err(ApiError::validation("Image file is empty"));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(ApiError::validation("Image must be smaller than 5MB"));
    }
    Ok(())
}
