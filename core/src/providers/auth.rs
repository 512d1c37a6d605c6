//! Credential resolution trait.

use crate::error::Result;
use crate::policy::Actor;
use async_trait::async_trait;

/// Resolves a bearer credential to an [`Actor`].
///
/// Token issuance and session management live behind this seam; the core
/// only needs to know who is calling and with what role. Implementations
/// return `Unauthenticated` for unknown, expired, or revoked credentials,
/// including credentials issued before the account's last password change.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a bearer token to the calling actor.
    async fn resolve(&self, token: &str) -> Result<Actor>;
}
