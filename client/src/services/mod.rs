//! One module per REST resource. Each function maps a single endpoint onto
//! typed request and response models.

pub mod auth;
pub mod events;
pub mod geocode;
pub mod host;
pub mod reviews;
pub mod tickets;
pub mod wishlist;

pub use geocode::{GeocodeResult, Geocoder};
