//! Event reviews
//!
//! Event-scoped calls take the raw id string and run it through the UUID v4
//! gate before any request goes out.

use uuid::Uuid;

use crate::api::ApiClient;
use crate::models::review::{MAX_RATING, MIN_RATING};
use crate::models::{NewReview, Review};
use crate::utils::error::{ApiError, ApiResult};
use crate::utils::validation::{is_blank, parse_event_id};

const MAX_COMMENT_CHARS: usize = 1000;

pub async fn for_event(client: &ApiClient, event_id: &str) -> ApiResult<Vec<Review>> {
    let event_id = parse_event_id(event_id)?;
    client.get(&format!("/events/{}/reviews", event_id)).await
}

pub async fn create(client: &ApiClient, event_id: &str, review: &NewReview) -> ApiResult<Review> {
    let event_id = parse_event_id(event_id)?;
    check_review(review)?;
    client
        .post(&format!("/events/{}/reviews", event_id), review)
        .await
}

pub async fn mark_helpful(client: &ApiClient, review_id: Uuid) -> ApiResult<Review> {
    client
        .post(&format!("/reviews/{}/helpful", review_id), &serde_json::json!({}))
        .await
}

pub async fn delete(client: &ApiClient, review_id: Uuid) -> ApiResult<()> {
    client.delete(&format!("/reviews/{}", review_id)).await
}

pub fn check_review(review: &NewReview) -> ApiResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
        return Err(ApiError::validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    if is_blank(&review.comment) {
        return Err(ApiError::validation("Please write a comment"));
    }
    if review.comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8, comment: &str) -> NewReview {
        NewReview {
            rating,
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert!(check_review(&review(0, "meh")).is_err());
        assert!(check_review(&review(1, "meh")).is_ok());
        assert!(check_review(&review(5, "great")).is_ok());
        assert!(check_review(&review(6, "great")).is_err());
    }

    #[test]
    fn test_comment_required_and_bounded() {
        assert!(check_review(&review(4, "   ")).is_err());
        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        assert!(check_review(&review(4, &long)).is_err());
    }
}
