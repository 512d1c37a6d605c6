//! Booking store over PostgreSQL.

use crate::error::map_sqlx;
use crate::sql::{col, push_plan, Column, Kind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use trailbound_core::domain::{Booking, BookingId, TourId, UserId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::BookingRepository;
use trailbound_core::query::QueryPlan;
use uuid::Uuid;

const COLUMNS: &[Column] = &[
    col("price", "price", Kind::Int),
    col("createdAt", "created_at", Kind::Timestamp),
];

/// Booking store over a connection pool. The unique (tour_id, user_id)
/// index makes duplicate purchases and duplicate webhook deliveries
/// collapse into `Conflict`.
#[derive(Debug, Clone)]
pub struct PgBookings {
    pool: PgPool,
}

impl PgBookings {
    /// Build the store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    tour_id: Uuid,
    user_id: Uuid,
    price: i64,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: BookingId(row.id),
            tour_id: TourId(row.tour_id),
            user_id: UserId(row.user_id),
            price: row.price,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl BookingRepository for PgBookings {
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Booking>> {
        let mut qb = QueryBuilder::new("SELECT * FROM bookings");
        push_plan(&mut qb, plan, COLUMNS, false)?;
        let rows: Vec<BookingRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn find_by_id(&self, id: BookingId) -> Result<Booking> {
        sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(Booking::from)
            .ok_or_else(|| Error::not_found("Booking", id))
    }

    async fn create(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            "INSERT INTO bookings (id, tour_id, user_id, price, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.tour_id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.price)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<()> {
        let result = sqlx::query("UPDATE bookings SET price = $2 WHERE id = $1")
            .bind(booking.id.as_uuid())
            .bind(booking.price)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Booking", booking.id));
        }
        Ok(())
    }

    async fn delete(&self, id: BookingId) -> Result<()> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Booking", id));
        }
        Ok(())
    }

    async fn find_by_user_and_tour(
        &self,
        user_id: UserId,
        tour_id: TourId,
    ) -> Result<Option<Booking>> {
        Ok(sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE user_id = $1 AND tour_id = $2",
        )
        .bind(user_id.as_uuid())
        .bind(tour_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?
        .map(Booking::from))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()> {
        sqlx::query("DELETE FROM bookings WHERE tour_id = $1")
            .bind(tour_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
