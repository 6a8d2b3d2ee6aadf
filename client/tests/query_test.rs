mod common;

use serde_json::json;
use uuid::Uuid;

use common::{event_json, spawn, spawn_logged_in};
use rave_client::models::{EventFilter, NewReview};
use rave_client::ApiError;

#[tokio::test]
async fn test_event_detail_is_cached() {
    let h = spawn().await;
    let id = Uuid::new_v4();
    h.api.events.lock().unwrap().push(event_json(
        id,
        "Afrobeats Night",
        "active",
        json!([{ "id": Uuid::new_v4(), "name": "General", "price": 5000, "totalQuantity": 100, "soldQuantity": 95 }]),
    ));

    let first = h.rave.event(id).await.unwrap();
    let second = h.rave.event(id).await.unwrap();
    assert_eq!(first.title, second.title);
    assert_eq!(first.ticket_types[0].remaining(), 5);
    assert_eq!(h.api.hit_count("GET /events/"), 1);
}

#[tokio::test]
async fn test_invalidation_forces_refetch() {
    let h = spawn().await;
    h.api
        .events
        .lock()
        .unwrap()
        .push(event_json(Uuid::new_v4(), "One", "active", json!([])));

    let filter = EventFilter::default();
    assert_eq!(h.rave.events(&filter).await.unwrap().len(), 1);

    h.api
        .events
        .lock()
        .unwrap()
        .push(event_json(Uuid::new_v4(), "Two", "active", json!([])));
    assert_eq!(h.rave.events(&filter).await.unwrap().len(), 1);

    h.rave.cache().invalidate(&rave_client::query::keys::events());
    assert_eq!(h.rave.events(&filter).await.unwrap().len(), 2);
    assert_eq!(h.api.hit_count("GET /events"), 2);
}

#[tokio::test]
async fn test_reviews_reject_bad_event_id_without_request() {
    let h = spawn().await;

    let err = h.rave.reviews("undefined").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(h.api.hits().is_empty());
    assert_eq!(h.notices.notices().len(), 1);
}

#[tokio::test]
async fn test_create_review() {
    let h = spawn_logged_in().await;
    let event_id = Uuid::new_v4().to_string();

    let review = h
        .rave
        .create_review(
            &event_id,
            &NewReview {
                rating: 5,
                comment: "Best night of the year".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(review.rating, 5);

    let err = h
        .rave
        .create_review(
            &event_id,
            &NewReview {
                rating: 6,
                comment: "Too good".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(h.api.hit_count("POST /events/"), 1);
}

#[tokio::test]
async fn test_check_in_passes_server_rejection_through() {
    let h = spawn_logged_in().await;

    let result = h.rave.check_in("RAVE-OK").await.unwrap();
    assert!(!result.already_checked_in);
    assert_eq!(result.attendee.name, "Bola");

    let err = h.rave.check_in("RAVE-FORGED").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TICKET");
    assert_eq!(err.message(), "This ticket is not valid for this event");

    let err = h.rave.check_in("   ").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}
