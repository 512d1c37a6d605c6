//! In-memory provider implementations for tests and local development.
//!
//! Every store here carries the same observable semantics as the SQL
//! backend, including the uniqueness constraints, so service-level tests
//! exercise the real orchestration logic against fast fakes.

mod auth;
mod bookings;
mod images;
mod notify;
pub mod plan;
mod reviews;
mod tours;
mod users;

pub use auth::StaticAuthProvider;
pub use bookings::InMemoryBookings;
pub use images::InMemoryImages;
pub use notify::{RecordingNotifier, SentMail};
pub use reviews::InMemoryReviews;
pub use tours::InMemoryTours;
pub use users::InMemoryUsers;

use std::sync::Arc;
use trailbound_core::providers::MockPaymentGateway;
use trailbound_core::Environment;

/// A fully wired in-memory world, keeping typed handles to each provider
/// alongside the [`Environment`] so tests can seed and inspect state.
#[derive(Debug, Clone)]
pub struct TestWorld {
    /// The wired environment, ready for service construction.
    pub env: Environment,
    /// Tour store handle.
    pub tours: Arc<InMemoryTours>,
    /// Review store handle.
    pub reviews: Arc<InMemoryReviews>,
    /// Booking store handle.
    pub bookings: Arc<InMemoryBookings>,
    /// User store handle.
    pub users: Arc<InMemoryUsers>,
    /// Token table handle.
    pub auth: Arc<StaticAuthProvider>,
    /// Outbox handle.
    pub notifier: Arc<RecordingNotifier>,
    /// Image store handle.
    pub images: Arc<InMemoryImages>,
}

impl TestWorld {
    /// A fresh world with the mock payment gateway wired in.
    #[must_use]
    pub fn new() -> Self {
        Self::build(true)
    }

    /// A fresh world without payment capability, for exercising the
    /// not-configured paths.
    #[must_use]
    pub fn without_payments() -> Self {
        Self::build(false)
    }

    fn build(with_payments: bool) -> Self {
        let tours = Arc::new(InMemoryTours::new());
        let reviews = Arc::new(InMemoryReviews::new());
        let bookings = Arc::new(InMemoryBookings::new());
        let users = Arc::new(InMemoryUsers::new());
        let auth = Arc::new(StaticAuthProvider::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let images = Arc::new(InMemoryImages::new());

        let env = Environment {
            tours: tours.clone(),
            reviews: reviews.clone(),
            bookings: bookings.clone(),
            users: users.clone(),
            auth: auth.clone(),
            notifier: notifier.clone(),
            images: images.clone(),
            payments: with_payments.then(|| Arc::new(MockPaymentGateway) as _),
        };

        Self {
            env,
            tours,
            reviews,
            bookings,
            users,
            auth,
            notifier,
            images,
        }
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
