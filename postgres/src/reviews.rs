//! Review store over PostgreSQL.

use crate::error::map_sqlx;
use crate::sql::{col, push_plan, Column, Kind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use trailbound_core::domain::{Review, ReviewId, TourId, UserId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::{RatingStats, ReviewRepository};
use trailbound_core::query::QueryPlan;
use uuid::Uuid;

const COLUMNS: &[Column] = &[
    col("rating", "rating", Kind::Int),
    col("createdAt", "created_at", Kind::Timestamp),
    col("updatedAt", "updated_at", Kind::Timestamp),
];

/// Review store over a connection pool. The unique (tour_id, user_id)
/// index carries the one-review-per-booking-pair rule.
#[derive(Debug, Clone)]
pub struct PgReviews {
    pool: PgPool,
}

impl PgReviews {
    /// Build the store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    review: String,
    rating: i16,
    tour_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId(row.id),
            text: row.review,
            rating: u8::try_from(row.rating).unwrap_or_default(),
            tour_id: TourId(row.tour_id),
            user_id: UserId(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    quantity: i64,
    average: Option<f64>,
}

#[async_trait]
impl ReviewRepository for PgReviews {
    async fn list(&self, tour_id: Option<TourId>, plan: &QueryPlan) -> Result<Vec<Review>> {
        let mut qb = QueryBuilder::new("SELECT * FROM reviews");
        let scoped = tour_id.is_some();
        if let Some(tour_id) = tour_id {
            qb.push(" WHERE tour_id = ");
            qb.push_bind(tour_id.as_uuid());
        }
        push_plan(&mut qb, plan, COLUMNS, scoped)?;
        let rows: Vec<ReviewRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Review> {
        sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .map(Review::from)
            .ok_or_else(|| Error::not_found("Review", id))
    }

    async fn create(&self, review: &Review) -> Result<()> {
        sqlx::query(
            "INSERT INTO reviews (id, review, rating, tour_id, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id.as_uuid())
        .bind(&review.text)
        .bind(i16::from(review.rating))
        .bind(review.tour_id.as_uuid())
        .bind(review.user_id.as_uuid())
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<()> {
        let result = sqlx::query(
            "UPDATE reviews SET review = $2, rating = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(review.id.as_uuid())
        .bind(&review.text)
        .bind(i16::from(review.rating))
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Review", review.id));
        }
        Ok(())
    }

    async fn delete(&self, id: ReviewId) -> Result<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Review", id));
        }
        Ok(())
    }

    async fn delete_by_tour(&self, tour_id: TourId) -> Result<()> {
        sqlx::query("DELETE FROM reviews WHERE tour_id = $1")
            .bind(tour_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn rating_stats(&self, tour_id: TourId) -> Result<Option<RatingStats>> {
        let row: StatsRow = sqlx::query_as(
            "SELECT COUNT(*) AS quantity, AVG(rating)::double precision AS average \
             FROM reviews WHERE tour_id = $1",
        )
        .bind(tour_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.average.map(|average| RatingStats {
            quantity: u32::try_from(row.quantity).unwrap_or_default(),
            average,
        }))
    }
}
