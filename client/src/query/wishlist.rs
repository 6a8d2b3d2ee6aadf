use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;
use uuid::Uuid;

use super::{keys, Rave};
use crate::services;
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::parse_event_id;

impl Rave {
    /// Flips wishlist membership for an event and returns the new state.
    ///
    /// The cached status flips before the request goes out; if the server
    /// rejects the change the previous status is restored and the error is
    /// both notified and returned. Ids that are not UUID v4 fail without any
    /// request. Toggles of the same event run one after another, so each
    /// one flips and rolls back against the state the previous one left.
    pub async fn toggle_wishlist(&self, event_id: &str) -> ApiResult<bool> {
        let id = match parse_event_id(event_id) {
            Ok(id) => id,
            Err(err) => {
                self.notify_error(&err);
                return Err(err);
            }
        };
        if !self.is_authenticated() {
            let err = ApiError::Unauthorized("Please log in to save events".to_string());
            self.notify_error(&err);
            return Err(err);
        }

        let lock = self.toggle_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.toggle_locked(id, event_id).await
        };
        drop(lock);
        self.release_toggle_lock(id);
        result
    }

    async fn toggle_locked(&self, id: Uuid, event_id: &str) -> ApiResult<bool> {
        let key = keys::wishlist_status(id);
        let current = match self.cache.get::<bool>(&key) {
            Some(current) => current,
            None => match self.is_wishlisted(event_id).await {
                Ok(status) => status.unwrap_or(false),
                Err(err) => {
                    self.notify_error(&err);
                    return Err(err);
                }
            },
        };
        let target = !current;

        let snapshot = self.cache.set_optimistic(&key, &target);
        debug!(event_id = %id, from = current, to = target, "Optimistic wishlist toggle");

        let result = if target {
            services::wishlist::add(&self.client, event_id).await
        } else {
            services::wishlist::remove(&self.client, event_id).await
        };

        match result {
            Ok(()) => {
                self.cache.invalidate(&keys::wishlist_events());
                self.notify_success(if target {
                    "Added to wishlist"
                } else {
                    "Removed from wishlist"
                });
                Ok(target)
            }
            Err(err) => {
                self.cache.rollback(snapshot);
                if err.is_unauthorized() {
                    self.cache.clear();
                }
                self.notify_error(&err);
                Err(err)
            }
        }
    }

    fn toggle_lock(&self, id: Uuid) -> Arc<AsyncMutex<()>> {
        self.toggles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(id)
            .or_default()
            .clone()
    }

    /// Forgets the lock once no other toggle of the event holds or awaits it.
    fn release_toggle_lock(&self, id: Uuid) {
        let mut toggles = self
            .toggles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if toggles.get(&id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            toggles.remove(&id);
        }
    }
}
