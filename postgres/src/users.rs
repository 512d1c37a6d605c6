//! User store over PostgreSQL.

use crate::error::{corrupt, map_sqlx};
use crate::sql::{col, push_plan, Column, Kind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use trailbound_core::domain::{User, UserId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::UserRepository;
use trailbound_core::query::QueryPlan;
use uuid::Uuid;

const COLUMNS: &[Column] = &[
    col("name", "name", Kind::Text),
    col("email", "email", Kind::Text),
    col("role", "role", Kind::Text),
    col("createdAt", "created_at", Kind::Timestamp),
];

/// User store over a connection pool. Soft deletion keeps the row and
/// clears `active`; the `*_active` lookups filter on it explicitly.
#[derive(Debug, Clone)]
pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    /// Build the store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    photo: Option<String>,
    password_hash: String,
    password_changed_at: Option<DateTime<Utc>>,
    password_reset_digest: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role = self.role.parse().map_err(|_| corrupt("role", &self.role))?;
        Ok(User {
            id: UserId(self.id),
            name: self.name,
            email: self.email,
            role,
            photo: self.photo,
            password_hash: self.password_hash,
            password_changed_at: self.password_changed_at,
            password_reset_digest: self.password_reset_digest,
            password_reset_expires: self.password_reset_expires,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PgUsers {
    async fn find_active(&self, plan: &QueryPlan) -> Result<Vec<User>> {
        let mut qb = QueryBuilder::new("SELECT * FROM users WHERE active = TRUE");
        push_plan(&mut qb, plan, COLUMNS, true)?;
        let rows: Vec<UserRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_by_id(&self, id: UserId) -> Result<User> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| Error::not_found("User", id))?
            .into_user()
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1 AND active = TRUE")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users \
             WHERE password_reset_digest = $1 AND password_reset_expires > NOW()",
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .map(UserRow::into_user)
        .transpose()
    }

    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, role, photo, password_hash, \
             password_changed_at, password_reset_digest, password_reset_expires, active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.photo)
        .bind(&user.password_hash)
        .bind(user.password_changed_at)
        .bind(&user.password_reset_digest)
        .bind(user.password_reset_expires)
        .bind(user.active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET name = $2, email = $3, role = $4, photo = $5, \
             password_hash = $6, password_changed_at = $7, password_reset_digest = $8, \
             password_reset_expires = $9, active = $10 WHERE id = $1",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.photo)
        .bind(&user.password_hash)
        .bind(user.password_changed_at)
        .bind(&user.password_reset_digest)
        .bind(user.password_reset_expires)
        .bind(user.active)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", user.id));
        }
        Ok(())
    }

    async fn deactivate(&self, id: UserId) -> Result<()> {
        let result = sqlx::query("UPDATE users SET active = FALSE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id));
        }
        Ok(())
    }
}
