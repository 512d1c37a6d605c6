//! Capability checks for authenticated actors.
//!
//! Services receive an [`Actor`] resolved by the auth boundary and gate
//! operations with [`require_role`] and [`require_owner_or_admin`]. The
//! checks are pure; no storage is consulted.

use crate::domain::{Role, UserId};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// An authenticated caller: identity plus role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The caller's user id.
    pub user_id: UserId,
    /// The caller's role.
    pub role: Role,
}

impl Actor {
    /// Build an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this actor is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Require the actor's role to be one of `allowed`.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] when the role is not in the allowed set.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(Error::forbidden(
            "you do not have permission to perform this action",
        ))
    }
}

/// Require the actor to be the resource owner or an administrator.
///
/// # Errors
///
/// Returns [`Error::Forbidden`] when the actor is neither.
pub fn require_owner_or_admin(actor: &Actor, owner: UserId) -> Result<()> {
    if actor.user_id == owner || actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden(
            "you do not have permission to perform this action",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor::new(UserId::new(), role)
    }

    #[test]
    fn role_gate_allows_listed_roles() {
        let lead = actor(Role::LeadGuide);
        assert!(require_role(&lead, &[Role::Admin, Role::LeadGuide]).is_ok());
        assert!(matches!(
            require_role(&lead, &[Role::Admin]),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn owner_check_accepts_owner_and_admin() {
        let owner = actor(Role::User);
        assert!(require_owner_or_admin(&owner, owner.user_id).is_ok());

        let admin = actor(Role::Admin);
        assert!(require_owner_or_admin(&admin, owner.user_id).is_ok());

        let stranger = actor(Role::User);
        assert!(matches!(
            require_owner_or_admin(&stranger, owner.user_id),
            Err(Error::Forbidden(_))
        ));
    }
}
