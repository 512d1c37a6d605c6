//! Environment-based configuration.

use std::env;
use trailbound_core::error::{Error, Result};

/// Server and provider configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Postgres connection string.
    pub database_url: String,
    /// Maximum pool connections.
    pub database_max_connections: u32,
    /// Public base URL used in emails and checkout redirects.
    pub base_url: String,
    /// Directory uploaded images land in.
    pub image_dir: String,
    /// Whether to wire the payment gateway.
    pub payments_enabled: bool,
    /// SMTP transport, absent means log-only email.
    pub smtp: Option<SmtpConfig>,
}

/// SMTP transport settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// Relay hostname.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Username, absent for unauthenticated relays.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// From address on outgoing mail.
    pub from: String,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Everything except `DATABASE_URL` has a development default. SMTP is
    /// wired only when `SMTP_HOST` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `DATABASE_URL` is missing.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::validation("DATABASE_URL must be set"))?;

        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "Trailbound <hello@trailbound.test>".to_string()),
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            image_dir: env::var("IMAGE_DIR").unwrap_or_else(|_| "public/img".to_string()),
            payments_enabled: env::var("PAYMENTS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            smtp,
        })
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
