//! PostgreSQL implementations of the Trailbound storage traits.
//!
//! Query plans render to dynamic SQL through [`sql`], with a per-entity
//! column whitelist translating the API's camelCase field names to columns.
//! The unique indexes created by the migrations are the real concurrency
//! guarantee behind the service-level gates; [`error`] maps their
//! violations to `Conflict`.

mod bookings;
mod error;
mod reviews;
mod sql;
mod tours;
mod users;

pub use bookings::PgBookings;
pub use reviews::PgReviews;
pub use tours::PgTours;
pub use users::PgUsers;

use sqlx::PgPool;
use trailbound_core::error::{Error, Result};

/// Embedded migrations, applied at startup.
///
/// # Errors
///
/// Returns [`Error::Database`] when a migration cannot be applied.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| Error::Database(format!("migration failed: {e}")))
}

/// Wire all four stores over one pool.
#[must_use]
pub fn stores(pool: PgPool) -> (PgTours, PgReviews, PgBookings, PgUsers) {
    (
        PgTours::new(pool.clone()),
        PgReviews::new(pool.clone()),
        PgBookings::new(pool.clone()),
        PgUsers::new(pool),
    )
}
