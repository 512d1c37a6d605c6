//! Tour store over PostgreSQL.

use crate::error::{corrupt, map_sqlx};
use crate::sql::{col, push_plan, Column, Kind};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{PgPool, QueryBuilder};
use trailbound_core::domain::{Tour, TourId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::{MonthlyPlanEntry, TourRepository, TourStats};
use trailbound_core::query::QueryPlan;
use uuid::Uuid;

const COLUMNS: &[Column] = &[
    col("name", "name", Kind::Text),
    col("slug", "slug", Kind::Text),
    col("duration", "duration", Kind::Int),
    col("maxGroupSize", "max_group_size", Kind::Int),
    col("difficulty", "difficulty", Kind::Text),
    col("ratingsAverage", "ratings_average", Kind::Float),
    col("ratingsQuantity", "ratings_quantity", Kind::Int),
    col("price", "price", Kind::Int),
    col("priceDiscount", "price_discount", Kind::Int),
    col("secret", "secret", Kind::Bool),
    col("createdAt", "created_at", Kind::Timestamp),
    col("updatedAt", "updated_at", Kind::Timestamp),
];

/// Tour store over a connection pool.
#[derive(Debug, Clone)]
pub struct PgTours {
    pool: PgPool,
}

impl PgTours {
    /// Build the store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    name: String,
    slug: String,
    duration: i32,
    max_group_size: i32,
    difficulty: String,
    ratings_average: f64,
    ratings_quantity: i32,
    price: i64,
    price_discount: Option<i64>,
    summary: String,
    description: Option<String>,
    cover_image: Option<String>,
    images: Vec<String>,
    start_dates: Vec<DateTime<Utc>>,
    guides: Vec<Uuid>,
    secret: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TourRow {
    fn into_tour(self) -> Result<Tour> {
        let difficulty = self
            .difficulty
            .parse()
            .map_err(|_| corrupt("difficulty", &self.difficulty))?;
        Ok(Tour {
            id: TourId(self.id),
            name: self.name,
            slug: self.slug,
            duration: u32::try_from(self.duration).unwrap_or_default(),
            max_group_size: u32::try_from(self.max_group_size).unwrap_or_default(),
            difficulty,
            ratings_average: self.ratings_average,
            ratings_quantity: u32::try_from(self.ratings_quantity).unwrap_or_default(),
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary,
            description: self.description,
            cover_image: self.cover_image,
            images: self.images,
            start_dates: self.start_dates,
            guides: self.guides.into_iter().map(trailbound_core::domain::UserId).collect(),
            secret: self.secret,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    difficulty: String,
    num_tours: i64,
    num_ratings: i64,
    avg_rating: f64,
    avg_price: f64,
    min_price: i64,
    max_price: i64,
}

#[derive(sqlx::FromRow)]
struct MonthRow {
    month: i32,
    num_tour_starts: i64,
    tours: Vec<String>,
}

/// Half-open [Jan 1 of `year`, Jan 1 of `year + 1`) window for the
/// monthly plan query. The year comes straight from the request path, so
/// both the increment and the calendar conversion must reject extremes.
fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let next_year = year
        .checked_add(1)
        .ok_or_else(|| Error::validation(format!("invalid year {year}")))?;
    let from = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::validation(format!("invalid year {year}")))?;
    let to = Utc
        .with_ymd_and_hms(next_year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| Error::validation(format!("invalid year {year}")))?;
    Ok((from, to))
}

#[async_trait]
impl TourRepository for PgTours {
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Tour>> {
        let mut qb = QueryBuilder::new("SELECT * FROM tours");
        push_plan(&mut qb, plan, COLUMNS, false)?;
        let rows: Vec<TourRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(TourRow::into_tour).collect()
    }

    async fn find_by_id(&self, id: TourId) -> Result<Tour> {
        sqlx::query_as::<_, TourRow>("SELECT * FROM tours WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| Error::not_found("Tour", id))?
            .into_tour()
    }

    async fn create(&self, tour: &Tour) -> Result<()> {
        sqlx::query(
            "INSERT INTO tours (id, name, slug, duration, max_group_size, difficulty, \
             ratings_average, ratings_quantity, price, price_discount, summary, description, \
             cover_image, images, start_dates, guides, secret, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(tour.id.as_uuid())
        .bind(&tour.name)
        .bind(&tour.slug)
        .bind(i32::try_from(tour.duration).unwrap_or(i32::MAX))
        .bind(i32::try_from(tour.max_group_size).unwrap_or(i32::MAX))
        .bind(tour.difficulty.as_str())
        .bind(tour.ratings_average)
        .bind(i32::try_from(tour.ratings_quantity).unwrap_or(i32::MAX))
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(&tour.description)
        .bind(&tour.cover_image)
        .bind(&tour.images)
        .bind(&tour.start_dates)
        .bind(tour.guides.iter().map(|g| g.as_uuid()).collect::<Vec<_>>())
        .bind(tour.secret)
        .bind(tour.created_at)
        .bind(tour.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(&self, tour: &Tour) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tours SET name = $2, slug = $3, duration = $4, max_group_size = $5, \
             difficulty = $6, price = $7, price_discount = $8, summary = $9, description = $10, \
             cover_image = $11, images = $12, start_dates = $13, guides = $14, secret = $15, \
             updated_at = $16 WHERE id = $1",
        )
        .bind(tour.id.as_uuid())
        .bind(&tour.name)
        .bind(&tour.slug)
        .bind(i32::try_from(tour.duration).unwrap_or(i32::MAX))
        .bind(i32::try_from(tour.max_group_size).unwrap_or(i32::MAX))
        .bind(tour.difficulty.as_str())
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(&tour.description)
        .bind(&tour.cover_image)
        .bind(&tour.images)
        .bind(&tour.start_dates)
        .bind(tour.guides.iter().map(|g| g.as_uuid()).collect::<Vec<_>>())
        .bind(tour.secret)
        .bind(tour.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Tour", tour.id));
        }
        Ok(())
    }

    async fn delete(&self, id: TourId) -> Result<()> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Tour", id));
        }
        Ok(())
    }

    async fn set_ratings(&self, id: TourId, quantity: u32, average: f64) -> Result<()> {
        let result =
            sqlx::query("UPDATE tours SET ratings_quantity = $2, ratings_average = $3 WHERE id = $1")
                .bind(id.as_uuid())
                .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
                .bind(average)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Tour", id));
        }
        Ok(())
    }

    async fn stats_by_difficulty(&self) -> Result<Vec<TourStats>> {
        let rows: Vec<StatsRow> = sqlx::query_as(
            "SELECT difficulty, COUNT(*) AS num_tours, \
             COALESCE(SUM(ratings_quantity), 0)::bigint AS num_ratings, \
             AVG(ratings_average) AS avg_rating, \
             AVG(price)::double precision AS avg_price, \
             MIN(price) AS min_price, MAX(price) AS max_price \
             FROM tours WHERE ratings_average >= 4.5 \
             GROUP BY difficulty ORDER BY avg_price ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows
            .into_iter()
            .map(|r| TourStats {
                difficulty: r.difficulty,
                num_tours: u64::try_from(r.num_tours).unwrap_or_default(),
                num_ratings: u64::try_from(r.num_ratings).unwrap_or_default(),
                avg_rating: r.avg_rating,
                avg_price: r.avg_price,
                min_price: r.min_price,
                max_price: r.max_price,
            })
            .collect())
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlanEntry>> {
        let (from, to) = year_bounds(year)?;

        let rows: Vec<MonthRow> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM start)::int AS month, \
             COUNT(*) AS num_tour_starts, ARRAY_AGG(name) AS tours \
             FROM tours, UNNEST(start_dates) AS start \
             WHERE start >= $1 AND start < $2 \
             GROUP BY month ORDER BY num_tour_starts DESC, month ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows
            .into_iter()
            .map(|r| MonthlyPlanEntry {
                month: u32::try_from(r.month).unwrap_or_default(),
                num_tour_starts: u64::try_from(r.num_tour_starts).unwrap_or_default(),
                tours: r.tours,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn year_bounds_cover_the_whole_year() {
        let (from, to) = year_bounds(2026).unwrap();
        assert_eq!(from.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2027-01-01T00:00:00+00:00");
    }

    #[test]
    fn extreme_years_are_rejected_not_panicked_on() {
        assert!(matches!(
            year_bounds(i32::MAX),
            Err(Error::Validation(_))
        ));
        assert!(matches!(year_bounds(i32::MIN), Err(Error::Validation(_))));
    }
}
