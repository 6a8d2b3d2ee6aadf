//! # Bearer-token persistence
//!
//! The API client never holds the session token itself; it reads and writes
//! it through a [`TokenStore`]. Two implementations ship with the crate:
//!
//! | Store | Use |
//! |-------|-----|
//! | [`MemoryTokenStore`] | Tests and throwaway sessions. |
//! | [`FileTokenStore`] | CLI and desktop use; the token survives restarts in a single file whose name is fixed ([`TOKEN_KEY`]). |

mod file;
mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

/// Fixed key the session token is persisted under.
pub const TOKEN_KEY: &str = "rave_auth_token";

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}
