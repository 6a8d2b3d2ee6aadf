//! HTTP client for the rave REST API

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::store::TokenStore;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::response::{decode_error, decode_success};

/// Thin wrapper over `reqwest` that knows the API base URL, attaches the
/// stored bearer token and normalizes every failure into [`ApiError`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    upload_timeout: Duration,
    event_load_timeout: Duration,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the underlying HTTP client cannot be built
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base(),
            tokens,
            upload_timeout: config.upload_timeout,
            event_load_timeout: config.event_load_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn event_load_timeout(&self) -> Duration {
        self.event_load_timeout
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.get().is_some()
    }

    pub fn set_token(&self, token: &str) {
        self.tokens.set(token);
        info!("Session token stored");
    }

    pub fn clear_token(&self) {
        self.tokens.clear();
        info!("Session token cleared");
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub async fn get<T>(&self, path: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// POST whose response body is irrelevant to the caller.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.dispatch(self.request(Method::POST, path).json(body))
            .await
            .map(|_| ())
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.dispatch(self.request(Method::DELETE, path))
            .await
            .map(|_| ())
    }

    /// Multipart upload, raced against the upload deadline on top of the
    /// client-wide request timeout.
    pub async fn upload<T>(&self, path: &str, form: Form) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).multipart(form);
        with_deadline(self.upload_timeout, self.send(request)).await
    }

    async fn send<T>(&self, builder: RequestBuilder) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let bytes = self.dispatch(builder).await?;
        decode_success(&bytes).map_err(|e| {
            e.log();
            e
        })
    }

    /// Sends the request and returns the raw body of a 2xx response.
    /// A 401 on an authenticated request wipes the stored token before the
    /// error is returned; on an anonymous one (a login attempt) it carries
    /// the server's message instead.
    async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let token = self.tokens.get();
        let had_token = token.is_some();
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        let request = builder.build().map_err(ApiError::from)?;
        let method = request.method().clone();
        let url = request.url().to_string();
        debug!(%method, %url, "API request");

        let response = self.http.execute(request).await.map_err(|e| {
            let err = ApiError::from(e);
            err.log();
            err
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        debug!(%method, %url, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(bytes.to_vec());
        }

        let body = decode_error(&bytes);
        let err = if status == StatusCode::UNAUTHORIZED && !had_token {
            ApiError::credentials_rejected(body)
        } else {
            ApiError::from_status(status, body)
        };
        if err.is_unauthorized() && had_token {
            self.clear_token();
        }
        err.log();
        Err(err)
    }
}

/// Races `future` against a deadline, mapping expiry to `ApiError::Timeout`.
pub async fn with_deadline<T, F>(deadline: Duration, future: F) -> ApiResult<T>
where
    F: std::future::Future<Output = ApiResult<T>>,
{
    tokio::time::timeout(deadline, future).await?
}
