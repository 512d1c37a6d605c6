//! Shared application state.

use std::sync::Arc;
use trailbound_core::booking_gate::BookingGate;
use trailbound_core::providers::AuthProvider;
use trailbound_core::ratings::AggregateMaintainer;
use trailbound_core::services::{BookingService, ReviewService, TourService, UserService};
use trailbound_core::Environment;

/// Everything handlers reach for, cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Tour operations.
    pub tours: TourService,
    /// Review operations.
    pub reviews: ReviewService,
    /// Booking operations.
    pub bookings: BookingService,
    /// Account operations.
    pub users: UserService,
    /// Credential resolution for the `CurrentUser` extractor.
    pub auth: Arc<dyn AuthProvider>,
    /// Public base URL for reset links and checkout redirects.
    pub base_url: String,
}

impl AppState {
    /// Wire the services over an environment.
    #[must_use]
    pub fn new(env: Environment, base_url: String) -> Self {
        let gate = Arc::new(BookingGate::new(env.bookings.clone()));
        let ratings = Arc::new(AggregateMaintainer::new(
            env.tours.clone(),
            env.reviews.clone(),
        ));
        Self {
            tours: TourService::new(env.clone()),
            reviews: ReviewService::new(env.clone(), gate.clone(), ratings),
            bookings: BookingService::new(env.clone(), gate),
            users: UserService::new(env.clone()),
            auth: env.auth,
            base_url,
        }
    }
}
