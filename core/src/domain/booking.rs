//! Booking entity.

use crate::domain::{BookingId, TourId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof of purchase for a tour.
///
/// Existence of a booking for a (user, tour) pair is the precondition for
/// reviewing that tour, and blocks a second booking of the same pair. The
/// pair is unique at the store level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking id.
    pub id: BookingId,
    /// The booked tour.
    pub tour_id: TourId,
    /// The purchasing user.
    pub user_id: UserId,
    /// Price paid in cents.
    pub price: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build a new booking.
    #[must_use]
    pub fn new(tour_id: TourId, user_id: UserId, price: i64) -> Self {
        Self {
            id: BookingId::new(),
            tour_id,
            user_id,
            price,
            created_at: Utc::now(),
        }
    }
}

/// Admin-path input for creating a booking directly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// The booked tour.
    pub tour_id: TourId,
    /// The purchasing user.
    pub user_id: UserId,
    /// Price paid in cents.
    pub price: i64,
}

/// Admin-path partial update. The (tour, user) pair is immutable once
/// booked; only the recorded price can be corrected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdate {
    /// Corrected price in cents.
    pub price: Option<i64>,
}
