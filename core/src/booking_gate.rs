//! Booking preconditions shared by the review and booking services.
//!
//! These checks are the friendly fast path; the store-level unique indexes
//! are the actual guarantee under concurrency, surfacing as `Conflict` from
//! the repositories when two requests race past the gate.

use crate::domain::{TourId, UserId};
use crate::error::{Error, Result};
use crate::providers::BookingRepository;
use std::sync::Arc;

/// Checks booking-derived preconditions.
pub struct BookingGate {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingGate {
    /// Build a gate over the booking store.
    #[must_use]
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    /// A user may only review tours they have booked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] when no booking exists, and propagates
    /// storage errors.
    pub async fn assert_can_review(&self, user_id: UserId, tour_id: TourId) -> Result<()> {
        match self.bookings.find_by_user_and_tour(user_id, tour_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::forbidden(
                "you can only review tours you have booked",
            )),
        }
    }

    /// A user may book each tour at most once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] when a booking already exists, and
    /// propagates storage errors.
    pub async fn assert_not_already_booked(&self, user_id: UserId, tour_id: TourId) -> Result<()> {
        match self.bookings.find_by_user_and_tour(user_id, tour_id).await? {
            Some(_) => Err(Error::conflict("you have already booked this tour")),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for BookingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingGate").finish_non_exhaustive()
    }
}
