//! In-memory review store.

use crate::plan::apply_plan;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trailbound_core::domain::{Review, ReviewId, TourId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::{RatingStats, ReviewRepository};
use trailbound_core::query::QueryPlan;

/// Review store backed by a map, enforcing the unique (tour, user) pair
/// exactly like the SQL backend's index.
#[derive(Debug, Default)]
pub struct InMemoryReviews {
    inner: RwLock<HashMap<ReviewId, Review>>,
}

impl InMemoryReviews {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn list(&self, tour_id: Option<TourId>, plan: &QueryPlan) -> Result<Vec<Review>> {
        let inner = self.inner.read().await;
        let scoped: Vec<Review> = inner
            .values()
            .filter(|r| tour_id.is_none_or(|t| r.tour_id == t))
            .cloned()
            .collect();
        Ok(apply_plan(&scoped, plan))
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Review> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("Review", id))
    }

    async fn create(&self, review: &Review) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner
            .values()
            .any(|r| r.tour_id == review.tour_id && r.user_id == review.user_id)
        {
            return Err(Error::conflict("you have already reviewed this tour"));
        }
        inner.insert(review.id, review.clone());
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&review.id) {
            return Err(Error::not_found("Review", review.id));
        }
        inner.insert(review.id, review.clone());
        Ok(())
    }

    async fn delete(&self, id: ReviewId) -> Result<()> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Review", id))
    }

    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()> {
        self.inner
            .write()
            .await
            .retain(|_, r| r.tour_id != tour_id);
        Ok(())
    }

    async fn rating_stats(&self, tour_id: TourId) -> Result<Option<RatingStats>> {
        let inner = self.inner.read().await;
        let ratings: Vec<u8> = inner
            .values()
            .filter(|r| r.tour_id == tour_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return Ok(None);
        }
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let stats = RatingStats {
            quantity: ratings.len() as u32,
            average: ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64,
        };
        Ok(Some(stats))
    }
}
