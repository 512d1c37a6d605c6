//! Tour storage trait and aggregate row types.

use crate::domain::{Tour, TourId};
use crate::error::Result;
use crate::query::QueryPlan;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One row of the tour-stats aggregate: tours of a given difficulty with
/// an average rating of at least 4.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStats {
    /// Difficulty bucket.
    pub difficulty: String,
    /// Tours in the bucket.
    pub num_tours: u64,
    /// Total ratings across the bucket.
    pub num_ratings: u64,
    /// Mean of the tours' average ratings.
    pub avg_rating: f64,
    /// Mean price in cents.
    pub avg_price: f64,
    /// Cheapest tour in cents.
    pub min_price: i64,
    /// Most expensive tour in cents.
    pub max_price: i64,
}

/// One row of the monthly plan: how many tours start in a given month of
/// the requested year, and which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlanEntry {
    /// Month number, 1-12.
    pub month: u32,
    /// Tour starts that month.
    pub num_tour_starts: u64,
    /// Names of the starting tours.
    pub tours: Vec<String>,
}

/// Tour storage.
///
/// Listing applies a [`QueryPlan`] as-is; visibility filtering is the
/// caller's responsibility via [`QueryPlan::with_public_tours`].
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// List tours matching the plan.
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Tour>>;

    /// Fetch one tour by id, `NotFound` when absent.
    async fn find_by_id(&self, id: TourId) -> Result<Tour>;

    /// Insert a tour. `Conflict` on a duplicate name.
    async fn create(&self, tour: &Tour) -> Result<()>;

    /// Persist the full current state of an existing tour.
    async fn update(&self, tour: &Tour) -> Result<()>;

    /// Delete a tour, `NotFound` when absent.
    async fn delete(&self, id: TourId) -> Result<()>;

    /// Write both derived rating fields in a single store operation.
    async fn set_ratings(&self, id: TourId, quantity: u32, average: f64) -> Result<()>;

    /// Stats grouped by difficulty over tours rated at least 4.5, ordered
    /// by average price ascending.
    async fn stats_by_difficulty(&self) -> Result<Vec<TourStats>>;

    /// Tour starts per month of `year`, busiest months first.
    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlanEntry>>;
}
