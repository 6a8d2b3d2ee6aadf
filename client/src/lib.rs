//! Typed client and data layer for the rave events marketplace API.
//!
//! Layers, bottom up: [`api::ApiClient`] (HTTP, bearer auth, error
//! normalization), [`services`] (one module per REST resource),
//! [`query::Rave`] (cached reads, invalidating mutations, optimistic wishlist
//! toggle) and [`flows`] (event wizard, ticket selection, checkout).

pub mod api;
pub mod config;
pub mod flows;
pub mod models;
pub mod notify;
pub mod query;
pub mod services;
pub mod store;
pub mod utils;

pub use api::ApiClient;
pub use config::Config;
pub use query::Rave;
pub use utils::error::{ApiError, ApiResult};
