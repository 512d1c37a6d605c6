//! Account lifecycle: signup, login, password flows, profile, admin CRUD.

use crate::domain::{
    validate_email, AdminUserUpdate, ProfileUpdate, Role, Signup, User, UserId, PASSWORD_MIN_LEN,
};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::policy::{require_role, Actor};
use crate::providers::Notifier;
use crate::query::QueryPlan;
use base64::Engine as _;
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Account operations.
///
/// Credential issuance lives behind the [`crate::providers::AuthProvider`]
/// seam; this service only deals in verified passwords and returns the
/// account for the boundary to mint whatever credential it uses.
#[derive(Debug, Clone)]
pub struct UserService {
    env: Environment,
}

impl UserService {
    /// Build the service over an environment.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Create an account and spawn the welcome email.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for constraint violations,
    /// [`Error::Conflict`] on a duplicate email.
    pub async fn signup(&self, input: Signup) -> Result<User> {
        input.validate()?;
        let hash = hash_password(&input.password)?;
        let user = User::new(input.name, input.email, hash);
        self.env.users.create(&user).await?;

        let notifier: Arc<dyn Notifier> = Arc::clone(&self.env.notifier);
        let sent_to = user.clone();
        tokio::spawn(async move {
            if let Err(error) = notifier.send_welcome(&sent_to).await {
                tracing::warn!(%error, "welcome email failed");
            }
        });
        Ok(user)
    }

    /// Verify an email/password pair against an active account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] on any miss. The message never
    /// says which half was wrong, and soft-deleted accounts miss exactly
    /// like nonexistent ones.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let miss = || Error::unauthenticated("incorrect email or password");
        let user = self
            .env
            .users
            .find_active_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(miss)?;
        if verify_password(password, &user.password_hash)? {
            Ok(user)
        } else {
            Err(miss())
        }
    }

    /// Issue a password-reset token and mail it.
    ///
    /// Only the SHA-256 digest of the token is stored; the plaintext goes
    /// into the mail and nowhere else. This send is on the request path:
    /// when it fails the token is cleared again and the caller sees
    /// `Upstream`, so no unusable token is left outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown email,
    /// [`Error::Upstream`] when the mail cannot be sent.
    pub async fn forgot_password(&self, email: &str, reset_url_base: &str) -> Result<()> {
        let Some(mut user) = self
            .env
            .users
            .find_active_by_email(&email.to_lowercase())
            .await?
        else {
            return Err(Error::not_found("User", email));
        };

        let token = generate_reset_token();
        user.password_reset_digest = Some(digest_token(&token));
        user.password_reset_expires = Some(Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES));
        self.env.users.update(&user).await?;

        let reset_url = format!("{}/{token}", reset_url_base.trim_end_matches('/'));
        if let Err(error) = self.env.notifier.send_password_reset(&user, &reset_url).await {
            tracing::error!(%error, "password reset email failed, clearing token");
            user.password_reset_digest = None;
            user.password_reset_expires = None;
            self.env.users.update(&user).await?;
            return Err(Error::Upstream(
                "there was an error sending the email, try again later".to_string(),
            ));
        }
        Ok(())
    }

    /// Redeem a reset token for a new password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an invalid or expired token and
    /// for password constraint violations.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User> {
        let Some(mut user) = self
            .env
            .users
            .find_by_reset_digest(&digest_token(token))
            .await?
        else {
            return Err(Error::validation("token is invalid or has expired"));
        };

        check_new_password(password, password_confirm)?;
        user.password_hash = hash_password(password)?;
        user.password_reset_digest = None;
        user.password_reset_expires = None;
        user.password_changed_at = Some(backdated_now());
        self.env.users.update(&user).await?;
        Ok(user)
    }

    /// Change the actor's password, verifying the current one first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthenticated`] when the current password is
    /// wrong, [`Error::Validation`] for constraint violations.
    pub async fn update_password(
        &self,
        actor: &Actor,
        current: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<User> {
        let mut user = self.env.users.find_by_id(actor.user_id).await?;
        if !verify_password(current, &user.password_hash)? {
            return Err(Error::unauthenticated("your current password is wrong"));
        }
        check_new_password(password, password_confirm)?;
        user.password_hash = hash_password(password)?;
        user.password_changed_at = Some(backdated_now());
        self.env.users.update(&user).await?;
        Ok(user)
    }

    /// The actor's own account.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn me(&self, actor: &Actor) -> Result<User> {
        self.env.users.find_by_id(actor.user_id).await
    }

    /// Patch the actor's profile. Password and role are not reachable
    /// through this path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a malformed email,
    /// [`Error::Conflict`] when the new email is taken.
    pub async fn update_me(&self, actor: &Actor, patch: ProfileUpdate) -> Result<User> {
        let mut user = self.env.users.find_by_id(actor.user_id).await?;
        apply_profile_patch(&mut user, patch)?;
        self.env.users.update(&user).await?;
        Ok(user)
    }

    /// Store a new profile photo and attach it.
    ///
    /// # Errors
    ///
    /// Propagates image-store and storage errors.
    pub async fn update_photo(&self, actor: &Actor, bytes: &[u8]) -> Result<User> {
        let mut user = self.env.users.find_by_id(actor.user_id).await?;
        let name_hint = format!("user-{}", user.id);
        user.photo = Some(self.env.images.store_image(bytes, &name_hint).await?);
        self.env.users.update(&user).await?;
        Ok(user)
    }

    /// Soft-delete the actor's account. The row stays for referential
    /// integrity; the account just stops resolving.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn delete_me(&self, actor: &Actor) -> Result<()> {
        self.env.users.deactivate(actor.user_id).await
    }

    /// Admin listing over active accounts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles.
    pub async fn list(&self, actor: &Actor, plan: QueryPlan) -> Result<Vec<User>> {
        require_role(actor, &[Role::Admin])?;
        self.env.users.find_active(&plan).await
    }

    /// Admin fetch by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] when absent.
    pub async fn get(&self, actor: &Actor, id: UserId) -> Result<User> {
        require_role(actor, &[Role::Admin])?;
        self.env.users.find_by_id(id).await
    }

    /// Admin patch: name, email, role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles,
    /// [`Error::NotFound`] when absent, [`Error::Validation`] for a
    /// malformed email.
    pub async fn admin_update(
        &self,
        actor: &Actor,
        id: UserId,
        patch: AdminUserUpdate,
    ) -> Result<User> {
        require_role(actor, &[Role::Admin])?;
        let mut user = self.env.users.find_by_id(id).await?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            user.email = email.to_lowercase();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        self.env.users.update(&user).await?;
        Ok(user)
    }

    /// Admin delete: same soft delete as self-service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for non-admin roles.
    pub async fn admin_delete(&self, actor: &Actor, id: UserId) -> Result<()> {
        require_role(actor, &[Role::Admin])?;
        self.env.users.deactivate(id).await
    }
}

fn apply_profile_patch(user: &mut User, patch: ProfileUpdate) -> Result<()> {
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
        user.name = name;
    }
    if let Some(email) = patch.email {
        validate_email(&email)?;
        user.email = email.to_lowercase();
    }
    if let Some(photo) = patch.photo {
        user.photo = Some(photo);
    }
    Ok(())
}

fn check_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(Error::validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(Error::validation("passwords do not match"));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|error| {
        tracing::error!(%error, "password hashing failed");
        Error::Internal
    })
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(|error| {
        tracing::error!(%error, "password verification failed");
        Error::Internal
    })
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn digest_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// The instant recorded as the password change time, backdated one second
/// so a credential minted in the same instant as the change still compares
/// as issued-after.
fn backdated_now() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::seconds(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_unique_and_digested() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_ne!(a, b);
        assert_eq!(digest_token(&a).len(), 64);
        assert_ne!(digest_token(&a), a);
    }

    #[test]
    fn new_password_constraints() {
        assert!(check_new_password("short", "short").is_err());
        assert!(check_new_password("longenough", "different").is_err());
        assert!(check_new_password("longenough", "longenough").is_ok());
    }

    #[test]
    fn profile_patch_rejects_bad_email() {
        let mut user = User::new("A".into(), "a@b.co".into(), String::new());
        let err = apply_profile_patch(
            &mut user,
            ProfileUpdate {
                email: Some("not-an-email".into()),
                ..ProfileUpdate::default()
            },
        );
        assert!(matches!(err, Err(Error::Validation(_))));
    }
}
