//! Booking storage trait.

use crate::domain::{Booking, BookingId, TourId, UserId};
use crate::error::Result;
use crate::query::QueryPlan;
use async_trait::async_trait;

/// Booking storage. The (tour, user) pair is unique; `create` maps a
/// store-level violation to `Conflict`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// List bookings matching the plan.
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Booking>>;

    /// Fetch one booking by id, `NotFound` when absent.
    async fn find_by_id(&self, id: BookingId) -> Result<Booking>;

    /// Insert a booking. `Conflict` when the user already booked the tour.
    async fn create(&self, booking: &Booking) -> Result<()>;

    /// Persist the full current state of an existing booking.
    async fn update(&self, booking: &Booking) -> Result<()>;

    /// Delete a booking, `NotFound` when absent.
    async fn delete(&self, id: BookingId) -> Result<()>;

    /// Look up the booking of a (user, tour) pair, if any.
    async fn find_by_user_and_tour(
        &self,
        user_id: UserId,
        tour_id: TourId,
    ) -> Result<Option<Booking>>;

    /// All bookings of one user, newest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>>;

    /// Delete every booking of a tour. Used by the tour-delete cascade.
    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()>;
}
