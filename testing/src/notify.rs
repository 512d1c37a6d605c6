//! Recording notifier for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use trailbound_core::domain::{Tour, User};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::Notifier;

/// A mail the recording notifier was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    /// Welcome mail to the given address.
    Welcome(String),
    /// Password reset mail to the given address, with the reset URL.
    PasswordReset(String, String),
    /// Booking confirmation to the given address, with the tour name.
    BookingConfirmation(String, String),
}

/// Notifier that records instead of sending. Flip [`fail_next`] to make
/// every send fail, for exercising the error paths.
///
/// [`fail_next`]: RecordingNotifier::fail
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Fresh notifier, not failing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, mail: SentMail) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Upstream("smtp transport refused".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_welcome(&self, user: &User) -> Result<()> {
        self.record(SentMail::Welcome(user.email.clone()))
    }

    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<()> {
        self.record(SentMail::PasswordReset(
            user.email.clone(),
            reset_url.to_string(),
        ))
    }

    async fn send_booking_confirmation(&self, user: &User, tour: &Tour) -> Result<()> {
        self.record(SentMail::BookingConfirmation(
            user.email.clone(),
            tour.name.clone(),
        ))
    }
}
