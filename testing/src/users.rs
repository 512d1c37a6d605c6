//! In-memory user store.

use crate::plan::apply_plan;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trailbound_core::domain::{User, UserId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::UserRepository;
use trailbound_core::query::QueryPlan;

/// User store backed by a map, enforcing email uniqueness across active
/// and deactivated accounts exactly like the SQL backend.
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUsers {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_active(&self, plan: &QueryPlan) -> Result<Vec<User>> {
        let inner = self.inner.read().await;
        let active: Vec<User> = inner.values().filter(|u| u.active).cloned().collect();
        Ok(apply_plan(&active, plan))
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("User", id))
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|u| u.active && u.email == email)
            .cloned())
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>> {
        let now = Utc::now();
        Ok(self
            .inner
            .read()
            .await
            .values()
            .find(|u| {
                u.password_reset_digest.as_deref() == Some(digest)
                    && u.password_reset_expires.is_some_and(|at| at > now)
            })
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.values().any(|u| u.email == user.email) {
            return Err(Error::conflict("an account with this email already exists"));
        }
        inner.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&user.id) {
            return Err(Error::not_found("User", user.id));
        }
        if inner
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(Error::conflict("an account with this email already exists"));
        }
        inner.insert(user.id, user.clone());
        Ok(())
    }

    async fn deactivate(&self, id: UserId) -> Result<()> {
        let mut inner = self.inner.write().await;
        let user = inner.get_mut(&id).ok_or_else(|| Error::not_found("User", id))?;
        user.active = false;
        Ok(())
    }
}
