mod cache;
mod hooks;
pub mod keys;
mod wishlist;

pub use cache::{QueryCache, QueryKey, Snapshot, Version};
pub use hooks::Rave;
