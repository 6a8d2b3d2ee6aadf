//! Address search against the external geocoder (Nominatim-compatible)

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::utils::error::{ApiError, ApiResult};

const MIN_QUERY_CHARS: usize = 3;
const RESULT_LIMIT: u8 = 5;
const USER_AGENT: &str = concat!("rave-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct RawPlace {
    display_name: String,
    lat: String,
    lon: String,
}

impl RawPlace {
    fn into_result(self) -> Option<GeocodeResult> {
        Some(GeocodeResult {
            latitude: self.lat.parse().ok()?,
            longitude: self.lon.parse().ok()?,
            display_name: self.display_name,
        })
    }
}

#[derive(Clone)]
pub struct Geocoder {
    http: Client,
    base_url: String,
}

impl Geocoder {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.geocode_url.trim_end_matches('/').to_string(),
        })
    }

    /// Free-text address search. Queries shorter than three characters
    /// return no results without a request.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<GeocodeResult>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let limit = RESULT_LIMIT.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let err = ApiError::from_status(status, None);
            err.log();
            return Err(err);
        }

        let places: Vec<RawPlace> = response.json().await?;
        Ok(places.into_iter().filter_map(RawPlace::into_result).collect())
    }
}
