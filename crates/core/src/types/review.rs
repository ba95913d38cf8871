//! Product reviews. Created by shoppers, never updated in place.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReviewId};

/// Highest rating a review can carry.
pub const MAX_RATING: u8 = 5;

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub reviewer_email: String,
    /// HTML review body.
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
}

/// Request body for creating a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub reviewer: String,
    pub reviewer_email: String,
    pub review: String,
    pub rating: u8,
}

impl NewReview {
    /// Build a review body, clamping the rating to `0..=5`.
    #[must_use]
    pub fn new(
        product_id: ProductId,
        reviewer: impl Into<String>,
        reviewer_email: impl Into<String>,
        review: impl Into<String>,
        rating: u8,
    ) -> Self {
        Self {
            product_id,
            reviewer: reviewer.into(),
            reviewer_email: reviewer_email.into(),
            review: review.into(),
            rating: rating.min(MAX_RATING),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_review_from_wire() {
        let review: Review = serde_json::from_str(
            r#"{"id": 22, "date_created": "2018-10-18T17:59:17", "product_id": 22,
                "status": "approved", "reviewer": "John Doe",
                "reviewer_email": "john.doe@example.com",
                "review": "Nice album!", "rating": 5, "verified": false}"#,
        )
        .unwrap();
        assert_eq!(review.id, ReviewId::new(22));
        assert_eq!(review.rating, 5);
        assert_eq!(review.reviewer, "John Doe");
    }

    #[test]
    fn test_new_review_clamps_rating() {
        let body = NewReview::new(ProductId::new(1), "A", "a@b.c", "ok", 9);
        assert_eq!(body.rating, MAX_RATING);
    }
}
