use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::utils::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default = "default_error_code")]
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

fn default_error_code() -> String {
    "HTTP_ERROR".to_string()
}

/// Decodes a 2xx body. Enveloped responses are unwrapped; anything else is
/// read as the payload itself.
pub fn decode_success<T>(bytes: &[u8]) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes)?
    };

    let is_envelope = value
        .as_object()
        .map(|obj| obj.get("success").is_some_and(Value::is_boolean) && !obj.contains_key("error"))
        .unwrap_or(false);

    if is_envelope {
        let envelope: ApiResponse<T> = serde_json::from_value(value)?;
        match envelope.data {
            Some(data) => Ok(data),
            // Empty-success responses decode into `()` or an `Option`.
            None => serde_json::from_value(Value::Null).map_err(ApiError::from),
        }
    } else {
        serde_json::from_value(value).map_err(ApiError::from)
    }
}

/// Pulls the server's error body out of a failed response, if it has one.
pub fn decode_error(bytes: &[u8]) -> Option<ApiErrorBody> {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorResponse>(bytes) {
        return Some(envelope.error);
    }
    serde_json::from_slice::<ApiErrorBody>(bytes).ok()
}
