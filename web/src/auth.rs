//! Development credential resolution.

use async_trait::async_trait;
use std::sync::Arc;
use trailbound_core::domain::UserId;
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::{AuthProvider, UserRepository};
use trailbound_core::Actor;

/// Resolves bearer tokens that are plain user ids.
///
/// This is the development stand-in for a real token scheme: login and
/// signup hand the client its user id, and the client sends it back as the
/// bearer credential. Soft-deleted accounts stop resolving immediately.
/// Swapping in signed tokens only means replacing this provider.
pub struct BearerUserAuthProvider {
    users: Arc<dyn UserRepository>,
}

impl BearerUserAuthProvider {
    /// Build the provider over the user store.
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthProvider for BearerUserAuthProvider {
    async fn resolve(&self, token: &str) -> Result<Actor> {
        let id: UserId = token
            .parse()
            .map_err(|_| Error::unauthenticated("invalid credential"))?;
        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|_| Error::unauthenticated("the user belonging to this credential no longer exists"))?;
        if !user.active {
            return Err(Error::unauthenticated(
                "the user belonging to this credential no longer exists",
            ));
        }
        Ok(Actor::new(user.id, user.role))
    }
}

impl std::fmt::Debug for BearerUserAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerUserAuthProvider").finish_non_exhaustive()
    }
}
