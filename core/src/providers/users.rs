//! User storage trait.

use crate::domain::{User, UserId};
use crate::error::Result;
use crate::query::QueryPlan;
use async_trait::async_trait;

/// User storage.
///
/// Soft-deleted accounts stay in the store with `active = false`. There is
/// no implicit visibility hook: callers that want only live accounts say so
/// by calling the `*_active` methods.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List active users matching the plan.
    async fn find_active(&self, plan: &QueryPlan) -> Result<Vec<User>>;

    /// Fetch one user by id regardless of the active flag, `NotFound` when
    /// absent.
    async fn find_by_id(&self, id: UserId) -> Result<User>;

    /// Look up an active account by (lowercased) email.
    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Look up the account holding an unexpired match for this reset-token
    /// digest.
    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>>;

    /// Insert a user. `Conflict` on a duplicate email.
    async fn create(&self, user: &User) -> Result<()>;

    /// Persist the full current state of an existing user.
    async fn update(&self, user: &User) -> Result<()>;

    /// Soft-delete: clear the active flag, keep the row.
    async fn deactivate(&self, id: UserId) -> Result<()>;
}
