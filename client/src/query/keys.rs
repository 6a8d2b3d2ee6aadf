//! Cache keys, one constructor per query. Prefix keys (`events()`,
//! `wishlist()`, ...) are what mutations invalidate.

use uuid::Uuid;

use super::QueryKey;
use crate::models::EventFilter;

pub fn me() -> QueryKey {
    QueryKey::new(["me"])
}

pub fn events() -> QueryKey {
    QueryKey::new(["events"])
}

pub fn event_list(filter: &EventFilter) -> QueryKey {
    QueryKey::new(["events".to_string(), "list".to_string(), filter.cache_fragment()])
}

pub fn event(id: Uuid) -> QueryKey {
    QueryKey::new(["events".to_string(), "detail".to_string(), id.to_string()])
}

pub fn hosted_events() -> QueryKey {
    QueryKey::new(["events", "hosted"])
}

pub fn wishlist() -> QueryKey {
    QueryKey::new(["wishlist"])
}

pub fn wishlist_events() -> QueryKey {
    QueryKey::new(["wishlist", "events"])
}

pub fn wishlist_status(event_id: Uuid) -> QueryKey {
    QueryKey::new(["wishlist".to_string(), "status".to_string(), event_id.to_string()])
}

pub fn tickets() -> QueryKey {
    QueryKey::new(["tickets"])
}

pub fn ticket(id: Uuid) -> QueryKey {
    QueryKey::new(["tickets".to_string(), id.to_string()])
}

pub fn reviews(event_id: Uuid) -> QueryKey {
    QueryKey::new(["reviews".to_string(), event_id.to_string()])
}

pub fn host() -> QueryKey {
    QueryKey::new(["host"])
}

pub fn host_analytics() -> QueryKey {
    QueryKey::new(["host", "analytics"])
}

pub fn attendees(event_id: Uuid) -> QueryKey {
    QueryKey::new(["host".to_string(), "attendees".to_string(), event_id.to_string()])
}

pub fn payouts() -> QueryKey {
    QueryKey::new(["host", "payouts"])
}

pub fn payout_account() -> QueryKey {
    QueryKey::new(["host", "payout-account"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_keys_sit_under_their_prefix() {
        let id = Uuid::new_v4();
        assert!(event(id).starts_with(&events()));
        assert!(event_list(&EventFilter::default()).starts_with(&events()));
        assert!(wishlist_status(id).starts_with(&wishlist()));
        assert!(!wishlist_status(id).starts_with(&wishlist_events()));
        assert!(attendees(id).starts_with(&host()));
        assert!(!reviews(id).starts_with(&events()));
    }
}
