//! Review entity and its input types.

use crate::domain::{ReviewId, TourId, UserId};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum review text length.
pub const TEXT_MIN_LEN: usize = 10;
/// Maximum review text length.
pub const TEXT_MAX_LEN: usize = 500;

/// A user's review of a tour.
///
/// At most one review may exist per (tour, user) pair; the store enforces
/// this with a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review id.
    pub id: ReviewId,
    /// Review text, 10-500 characters.
    pub text: String,
    /// Integer rating, 1-5.
    pub rating: u8,
    /// The reviewed tour.
    pub tour_id: TourId,
    /// The reviewing user.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Build a new review for the given tour and author.
    #[must_use]
    pub fn new(tour_id: TourId, user_id: UserId, input: NewReview) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::new(),
            text: input.text,
            rating: input.rating,
            tour_id,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place, revalidating the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the patched review violates a
    /// schema constraint.
    pub fn apply(&mut self, patch: ReviewUpdate) -> Result<()> {
        if let Some(text) = patch.text {
            self.text = text;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    /// Validate schema constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let len = self.text.trim().chars().count();
        if !(TEXT_MIN_LEN..=TEXT_MAX_LEN).contains(&len) {
            return Err(Error::validation(format!(
                "review must be between {TEXT_MIN_LEN} and {TEXT_MAX_LEN} characters"
            )));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(Error::validation("rating must be between 1 and 5"));
        }
        Ok(())
    }
}

/// Input for creating a review.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    /// Review text.
    #[serde(alias = "review")]
    pub text: String,
    /// Integer rating, 1-5.
    pub rating: u8,
}

/// Partial update for a review.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    /// New review text.
    #[serde(alias = "review")]
    pub text: Option<String>,
    /// New rating.
    pub rating: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_enforced() {
        let mut review = Review::new(
            TourId::new(),
            UserId::new(),
            NewReview {
                text: "An absolutely wonderful trip".to_string(),
                rating: 5,
            },
        );
        assert!(review.validate().is_ok());

        review.rating = 0;
        assert!(matches!(review.validate(), Err(Error::Validation(_))));
        review.rating = 6;
        assert!(matches!(review.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn text_length_is_enforced() {
        let review = Review::new(
            TourId::new(),
            UserId::new(),
            NewReview {
                text: "too short".to_string(),
                rating: 3,
            },
        );
        assert!(matches!(review.validate(), Err(Error::Validation(_))));
    }
}
