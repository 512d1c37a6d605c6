//! Outbound email trait and the log-only implementation.

use crate::domain::{Tour, User};
use crate::error::Result;
use async_trait::async_trait;

/// Sends transactional email.
///
/// Only the password-reset mail is on the request path; welcome and
/// booking-confirmation sends are spawned fire-and-forget by the services,
/// which log failures instead of surfacing them.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Greet a freshly signed-up user.
    async fn send_welcome(&self, user: &User) -> Result<()>;

    /// Mail the plaintext reset token with its reset URL.
    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<()>;

    /// Confirm a paid booking.
    async fn send_booking_confirmation(&self, user: &User, tour: &Tour) -> Result<()>;
}

/// Notifier that writes to the log instead of the wire. Default for
/// development when no SMTP transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, user: &User) -> Result<()> {
        tracing::info!(email = %user.email, "welcome email (log only)");
        Ok(())
    }

    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<()> {
        tracing::info!(email = %user.email, %reset_url, "password reset email (log only)");
        Ok(())
    }

    async fn send_booking_confirmation(&self, user: &User, tour: &Tour) -> Result<()> {
        tracing::info!(email = %user.email, tour = %tour.name, "booking confirmation email (log only)");
        Ok(())
    }
}
