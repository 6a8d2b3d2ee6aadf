mod client;

pub use client::{with_deadline, ApiClient};
