//! In-memory tour store.

use crate::plan::apply_plan;
use async_trait::async_trait;
use chrono::Datelike;
use std::collections::HashMap;
use tokio::sync::RwLock;
use trailbound_core::domain::{Tour, TourId};
use trailbound_core::error::{Error, Result};
use trailbound_core::providers::{MonthlyPlanEntry, TourRepository, TourStats};
use trailbound_core::query::QueryPlan;

/// Tour store backed by a map, with the same name-uniqueness semantics as
/// the SQL backend.
#[derive(Debug, Default)]
pub struct InMemoryTours {
    inner: RwLock<HashMap<TourId, Tour>>,
}

impl InMemoryTours {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TourRepository for InMemoryTours {
    async fn list(&self, plan: &QueryPlan) -> Result<Vec<Tour>> {
        let inner = self.inner.read().await;
        let all: Vec<Tour> = inner.values().cloned().collect();
        Ok(apply_plan(&all, plan))
    }

    async fn find_by_id(&self, id: TourId) -> Result<Tour> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("Tour", id))
    }

    async fn create(&self, tour: &Tour) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.values().any(|t| t.name == tour.name) {
            return Err(Error::conflict(format!(
                "a tour named {:?} already exists",
                tour.name
            )));
        }
        inner.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn update(&self, tour: &Tour) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.contains_key(&tour.id) {
            return Err(Error::not_found("Tour", tour.id));
        }
        inner.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn delete(&self, id: TourId) -> Result<()> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Tour", id))
    }

    async fn set_ratings(&self, id: TourId, quantity: u32, average: f64) -> Result<()> {
        let mut inner = self.inner.write().await;
        let tour = inner.get_mut(&id).ok_or_else(|| Error::not_found("Tour", id))?;
        tour.ratings_quantity = quantity;
        tour.ratings_average = average;
        Ok(())
    }

    async fn stats_by_difficulty(&self) -> Result<Vec<TourStats>> {
        let inner = self.inner.read().await;
        let mut buckets: HashMap<&'static str, Vec<&Tour>> = HashMap::new();
        for tour in inner.values().filter(|t| t.ratings_average >= 4.5) {
            buckets.entry(tour.difficulty.as_str()).or_default().push(tour);
        }

        let mut stats: Vec<TourStats> = buckets
            .into_iter()
            .map(|(difficulty, tours)| {
                let num_tours = tours.len() as u64;
                let num_ratings = tours.iter().map(|t| u64::from(t.ratings_quantity)).sum();
                #[allow(clippy::cast_precision_loss)]
                let avg_rating =
                    tours.iter().map(|t| t.ratings_average).sum::<f64>() / num_tours as f64;
                #[allow(clippy::cast_precision_loss)]
                let avg_price =
                    tours.iter().map(|t| t.price as f64).sum::<f64>() / num_tours as f64;
                TourStats {
                    difficulty: difficulty.to_string(),
                    num_tours,
                    num_ratings,
                    avg_rating,
                    avg_price,
                    min_price: tours.iter().map(|t| t.price).min().unwrap_or(0),
                    max_price: tours.iter().map(|t| t.price).max().unwrap_or(0),
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            a.avg_price
                .partial_cmp(&b.avg_price)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(stats)
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlanEntry>> {
        let inner = self.inner.read().await;
        let mut months: HashMap<u32, Vec<String>> = HashMap::new();
        for tour in inner.values() {
            for start in tour.start_dates.iter().filter(|d| d.year() == year) {
                months.entry(start.month()).or_default().push(tour.name.clone());
            }
        }
        let mut plan: Vec<MonthlyPlanEntry> = months
            .into_iter()
            .map(|(month, tours)| MonthlyPlanEntry {
                month,
                num_tour_starts: tours.len() as u64,
                tours,
            })
            .collect();
        plan.sort_by(|a, b| b.num_tour_starts.cmp(&a.num_tour_starts).then(a.month.cmp(&b.month)));
        Ok(plan)
    }
}
