//! Derived-rating maintenance for tours.
//!
//! `ratings_quantity` and `ratings_average` on a tour are derived from its
//! committed reviews and are only ever written here, from live data. The
//! review service calls [`AggregateMaintainer::recompute_or_log`] after each
//! durable review mutation with the tour id it captured before mutating.

use crate::domain::TourId;
use crate::error::Result;
use crate::providers::{ReviewRepository, TourRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Rating shown for a tour with no reviews.
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

/// Recomputes a tour's rating aggregate from its committed reviews.
///
/// Recomputes for the same tour are serialized through a per-tour async
/// mutex, so two triggers never interleave their read and write; triggers
/// for different tours run freely in parallel.
pub struct AggregateMaintainer {
    tours: Arc<dyn TourRepository>,
    reviews: Arc<dyn ReviewRepository>,
    locks: Mutex<HashMap<TourId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AggregateMaintainer {
    /// Build a maintainer over the given stores.
    #[must_use]
    pub fn new(tours: Arc<dyn TourRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self {
            tours,
            reviews,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Recompute and persist the tour's rating aggregate.
    ///
    /// Reads the live count and mean over the tour's reviews and writes
    /// both derived fields in one store operation. A tour with no reviews
    /// resets to zero reviews at [`DEFAULT_RATINGS_AVERAGE`].
    ///
    /// # Errors
    ///
    /// Propagates storage errors from the stats read or the write.
    pub async fn recompute(&self, tour_id: TourId) -> Result<()> {
        let guard = self.lock_for(tour_id);
        let _held = guard.lock().await;

        let stats = self.reviews.rating_stats(tour_id).await?;
        let (quantity, average) =
            stats.map_or((0, DEFAULT_RATINGS_AVERAGE), |s| (s.quantity, s.average));
        self.tours.set_ratings(tour_id, quantity, average).await
    }

    /// Recompute, logging failure instead of propagating it.
    ///
    /// The triggering review write is already durable when this runs; a
    /// failed recompute leaves the aggregate stale until the next trigger,
    /// which reads live data and self-corrects.
    pub async fn recompute_or_log(&self, tour_id: TourId) {
        if let Err(error) = self.recompute(tour_id).await {
            tracing::error!(%tour_id, %error, "rating recompute failed, aggregate stale until next trigger");
        }
    }

    fn lock_for(&self, tour_id: TourId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            // A poisoned map only means a panic elsewhere; the map itself
            // holds nothing but mutex handles and stays usable.
            Err(poisoned) => poisoned.into_inner(),
        };
        // An entry only the map references has no recompute in flight;
        // dropping it here keeps the map bounded by concurrent recomputes
        // instead of every tour ever touched.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(tour_id).or_default())
    }
}

impl std::fmt::Debug for AggregateMaintainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateMaintainer").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{Difficulty, NewTour, Tour};
    use trailbound_testing::{InMemoryReviews, InMemoryTours};

    async fn seeded_tour(tours: &InMemoryTours, name: &str) -> TourId {
        let tour = Tour::new(NewTour {
            name: name.to_string(),
            duration: 3,
            max_group_size: 8,
            difficulty: Difficulty::Easy,
            price: 30_000,
            price_discount: None,
            summary: "Short and sweet".to_string(),
            description: None,
            start_dates: Vec::new(),
            guides: Vec::new(),
            secret: false,
        });
        let id = tour.id;
        tours.create(&tour).await.unwrap();
        id
    }

    #[tokio::test]
    async fn idle_lock_entries_are_reclaimed() {
        let tours = Arc::new(InMemoryTours::new());
        let reviews = Arc::new(InMemoryReviews::new());
        let first = seeded_tour(&tours, "The First Loop").await;
        let second = seeded_tour(&tours, "The Second Loop").await;
        let maintainer = AggregateMaintainer::new(tours, reviews);

        maintainer.recompute(first).await.unwrap();
        maintainer.recompute(second).await.unwrap();
        maintainer.recompute(first).await.unwrap();

        // Finished recomputes left no holders, so only the entry taken by
        // the most recent call can survive the sweep.
        assert!(maintainer.locks.lock().unwrap().len() <= 1);
    }
}
