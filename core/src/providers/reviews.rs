//! Review storage trait.

use crate::domain::{Review, ReviewId, TourId};
use crate::error::Result;
use crate::query::QueryPlan;
use async_trait::async_trait;

/// Live aggregate over a tour's committed reviews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingStats {
    /// Number of reviews.
    pub quantity: u32,
    /// Mean rating.
    pub average: f64,
}

/// Review storage. The (tour, user) pair is unique; `create` maps a
/// store-level violation to `Conflict`.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// List reviews matching the plan, optionally scoped to one tour.
    async fn list(&self, tour_id: Option<TourId>, plan: &QueryPlan) -> Result<Vec<Review>>;

    /// Fetch one review by id, `NotFound` when absent.
    async fn find_by_id(&self, id: ReviewId) -> Result<Review>;

    /// Insert a review. `Conflict` when the author already reviewed the tour.
    async fn create(&self, review: &Review) -> Result<()>;

    /// Persist the full current state of an existing review.
    async fn update(&self, review: &Review) -> Result<()>;

    /// Delete a review, `NotFound` when absent.
    async fn delete(&self, id: ReviewId) -> Result<()>;

    /// Delete every review of a tour. Used by the tour-delete cascade.
    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()>;

    /// Count and mean over the tour's committed reviews, `None` when the
    /// tour has no reviews.
    async fn rating_stats(&self, tour_id: TourId) -> Result<Option<RatingStats>>;
}
