//! In-memory booking store.

use crate::plan::apply_plan;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trailbound_core::domain::{Booking, BookingId, TourId, UserId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::BookingRepository;
use trailbound_core::query::QueryPlan;

/// Booking store backed by a map, enforcing the unique (tour, user) pair
/// exactly like the SQL backend's index.
#[derive(Debug, Default)]
pub struct InMemoryBookings {
    inner: RwLock<HashMap<BookingId, Booking>>,
}

impl InMemoryBookings {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Booking>> {
        let inner = self.inner.read().await;
        let all: Vec<Booking> = inner.values().cloned().collect();
        Ok(apply_plan(&all, plan))
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Booking> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("Booking", id))
    }

    async fn create(&self, booking: &Booking) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner
            .values()
            .any(|b| b.tour_id == booking.tour_id && b.user_id == booking.user_id)
        {
            return Err(Error::conflict("you have already booked this tour"));
        }
        inner.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&booking.id) {
            return Err(Error::not_found("Booking", booking.id));
        }
        inner.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn delete(&self, id: BookingId) -> Result<()> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Booking", id))
    }

    async fn find_by_user_and_tour(
        &self,
        user_id: UserId,
        tour_id: TourId,
    ) -> Result<Option<Booking>> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|b| b.user_id == user_id && b.tour_id == tour_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<Booking> = inner
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()> {
        self.inner
            .write()
            .await
            .retain(|_, b| b.tour_id != tour_id);
        Ok(())
    }
}
