//! Provider wiring for the services.

use crate::error::{Error, Result};
use crate::providers::{
    AuthProvider, BookingRepository, ImageProcessor, Notifier, PaymentGateway, ReviewRepository,
    TourRepository, UserRepository,
};
use std::sync::Arc;

/// Everything the services need from the outside world, wired once at
/// startup.
///
/// The payment gateway is optional: whether the deployment can take
/// payments is decided here, at construction, and checkout operations fail
/// with `Upstream` when it cannot. Nothing downstream consults globals.
#[derive(Clone)]
pub struct Environment {
    /// Tour storage.
    pub tours: Arc<dyn TourRepository>,
    /// Review storage.
    pub reviews: Arc<dyn ReviewRepository>,
    /// Booking storage.
    pub bookings: Arc<dyn BookingRepository>,
    /// User storage.
    pub users: Arc<dyn UserRepository>,
    /// Credential resolution.
    pub auth: Arc<dyn AuthProvider>,
    /// Outbound email.
    pub notifier: Arc<dyn Notifier>,
    /// Image storage.
    pub images: Arc<dyn ImageProcessor>,
    /// Payment gateway, absent when the deployment takes no payments.
    pub payments: Option<Arc<dyn PaymentGateway>>,
}

impl Environment {
    /// The payment gateway, or `Upstream` when none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] when the environment was built without
    /// a gateway.
    pub fn payments(&self) -> Result<&Arc<dyn PaymentGateway>> {
        self.payments
            .as_ref()
            .ok_or_else(|| Error::Upstream("payment gateway not configured".to_string()))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("payments", &self.payments.is_some())
            .finish_non_exhaustive()
    }
}
