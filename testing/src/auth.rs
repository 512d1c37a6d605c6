//! Static credential resolution for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use trailbound_core::error::{Error, Result};
use trailbound_core::policy::Actor;
use trailbound_core::providers::AuthProvider;

/// Auth provider backed by a fixed token table. Tests register an actor
/// under a token and pass that token as the bearer credential.
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    tokens: Mutex<HashMap<String, Actor>>,
}

impl StaticAuthProvider {
    /// Empty provider; every resolve fails until tokens are registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `actor` under `token`.
    pub fn register(&self, token: impl Into<String>, actor: Actor) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(token.into(), actor);
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn resolve(&self, token: &str) -> Result<Actor> {
        self.tokens
            .lock()
            .ok()
            .and_then(|tokens| tokens.get(token).copied())
            .ok_or_else(|| Error::unauthenticated("invalid or expired credential"))
    }
}
