//! Review CRUD with derived-rating maintenance.

use crate::booking_gate::BookingGate;
use crate::domain::{NewReview, Review, ReviewId, ReviewUpdate, Role, TourId};
use crate::environment::Environment;
use crate::error::Result;
use crate::policy::{require_owner_or_admin, require_role, Actor};
use crate::query::QueryPlan;
use crate::ratings::AggregateMaintainer;
use std::sync::Arc;

/// Review operations.
///
/// Every durable mutation is followed by an explicit rating recompute for
/// the affected tour, with the tour id captured before the mutation. The
/// recompute never fails the request; the review write already happened.
#[derive(Debug, Clone)]
pub struct ReviewService {
    env: Environment,
    gate: Arc<BookingGate>,
    ratings: Arc<AggregateMaintainer>,
}

impl ReviewService {
    /// Build the service over an environment and the shared gate and
    /// maintainer.
    #[must_use]
    pub const fn new(
        env: Environment,
        gate: Arc<BookingGate>,
        ratings: Arc<AggregateMaintainer>,
    ) -> Self {
        Self { env, gate, ratings }
    }

    /// List reviews, optionally scoped to one tour.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn list(&self, tour_id: Option<TourId>, plan: QueryPlan) -> Result<Vec<Review>> {
        self.env.reviews.list(tour_id, &plan).await
    }

    /// Fetch one review by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent.
    pub async fn get(&self, id: ReviewId) -> Result<Review> {
        self.env.reviews.find_by_id(id).await
    }

    /// Create a review. Customers only, and only for tours they booked.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Forbidden`] for non-customer roles or an
    /// unbooked tour, [`crate::Error::NotFound`] for a missing tour,
    /// [`crate::Error::Conflict`] when the author already reviewed it.
    pub async fn create(&self, actor: &Actor, tour_id: TourId, input: NewReview) -> Result<Review> {
        require_role(actor, &[Role::User])?;
        self.env.tours.find_by_id(tour_id).await?;
        self.gate.assert_can_review(actor.user_id, tour_id).await?;

        let review = Review::new(tour_id, actor.user_id, input);
        review.validate()?;
        self.env.reviews.create(&review).await?;

        self.ratings.recompute_or_log(tour_id).await;
        Ok(review)
    }

    /// Patch a review. Author or admin only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent,
    /// [`crate::Error::Forbidden`] for anyone else,
    /// [`crate::Error::Validation`] when the patch violates a constraint.
    pub async fn update(&self, actor: &Actor, id: ReviewId, patch: ReviewUpdate) -> Result<Review> {
        let mut review = self.env.reviews.find_by_id(id).await?;
        require_owner_or_admin(actor, review.user_id)?;
        let tour_id = review.tour_id;

        review.apply(patch)?;
        self.env.reviews.update(&review).await?;

        self.ratings.recompute_or_log(tour_id).await;
        Ok(review)
    }

    /// Delete a review. Author or admin only.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] when absent,
    /// [`crate::Error::Forbidden`] for anyone else.
    pub async fn delete(&self, actor: &Actor, id: ReviewId) -> Result<()> {
        let review = self.env.reviews.find_by_id(id).await?;
        require_owner_or_admin(actor, review.user_id)?;
        let tour_id = review.tour_id;

        self.env.reviews.delete(id).await?;

        self.ratings.recompute_or_log(tour_id).await;
        Ok(())
    }
}
