//! SMTP notifier over lettre.

use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use trailbound_core::domain::{Tour, User};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::Notifier;

/// Notifier sending through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    /// Build the transport from config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Upstream`] when the relay address is unusable.
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| Error::Upstream(format!("smtp relay setup failed: {e}")))?
            .port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: config.from.clone(),
        })
    }

    async fn send(&self, to: &User, subject: &str, body: String) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| Error::Upstream(format!("bad from address: {e}")))?,
            )
            .to(format!("{} <{}>", to.name, to.email)
                .parse()
                .map_err(|e| Error::Upstream(format!("bad recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| Error::Upstream(format!("mail build failed: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Upstream(format!("mail send failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send_welcome(&self, user: &User) -> Result<()> {
        self.send(
            user,
            "Welcome to Trailbound!",
            format!(
                "Hi {},\n\nWelcome aboard. Your next adventure is a booking away.\n",
                user.name
            ),
        )
        .await
    }

    async fn send_password_reset(&self, user: &User, reset_url: &str) -> Result<()> {
        self.send(
            user,
            "Your password reset token (valid for 10 minutes)",
            format!(
                "Hi {},\n\nForgot your password? Submit a new one at:\n{reset_url}\n\n\
                 If you didn't ask for this, ignore this email.\n",
                user.name
            ),
        )
        .await
    }

    async fn send_booking_confirmation(&self, user: &User, tour: &Tour) -> Result<()> {
        self.send(
            user,
            &format!("Your booking: {}", tour.name),
            format!(
                "Hi {},\n\nYour booking for \"{}\" is confirmed. See you on the trail!\n",
                user.name, tour.name
            ),
        )
        .await
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}
