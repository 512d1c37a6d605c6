//! Tour CRUD and aggregate reporting.

use crate::domain::{NewTour, Role, Tour, TourId, TourUpdate};
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::policy::{require_role, Actor};
use crate::providers::{MonthlyPlanEntry, TourStats};
use crate::query::QueryPlan;

/// Roles allowed to mutate tours.
const TOUR_EDITORS: [Role; 2] = [Role::Admin, Role::LeadGuide];

/// Tour operations.
#[derive(Debug, Clone)]
pub struct TourService {
    env: Environment,
}

impl TourService {
    /// Build the service over an environment.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Public listing: the plan is decorated to exclude secret tours.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn list(&self, plan: QueryPlan) -> Result<Vec<Tour>> {
        self.env.tours.list(&plan.with_public_tours()).await
    }

    /// Fetch one tour by id. Direct lookups resolve secret tours too;
    /// only listings hide them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when absent.
    pub async fn get(&self, id: TourId) -> Result<Tour> {
        self.env.tours.find_by_id(id).await
    }

    /// Create a tour. Admin or lead-guide only; derived rating fields start
    /// at their defaults no matter what the client sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for other roles, [`Error::Validation`]
    /// for schema or guide-role violations, [`Error::Conflict`] on a
    /// duplicate name.
    pub async fn create(&self, actor: &Actor, input: NewTour) -> Result<Tour> {
        require_role(actor, &TOUR_EDITORS)?;
        let tour = Tour::new(input);
        tour.validate()?;
        self.check_guides(&tour.guides).await?;
        self.env.tours.create(&tour).await?;
        Ok(tour)
    }

    /// Patch a tour. Admin or lead-guide only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for other roles, [`Error::NotFound`]
    /// when absent, [`Error::Validation`] when the patch violates a
    /// constraint.
    pub async fn update(&self, actor: &Actor, id: TourId, patch: TourUpdate) -> Result<Tour> {
        require_role(actor, &TOUR_EDITORS)?;
        let guides_changed = patch.guides.is_some();
        let mut tour = self.env.tours.find_by_id(id).await?;
        tour.apply(patch)?;
        if guides_changed {
            self.check_guides(&tour.guides).await?;
        }
        self.env.tours.update(&tour).await?;
        Ok(tour)
    }

    /// Store a new cover image and attach it to the tour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for other roles, [`Error::NotFound`]
    /// when absent, and propagates image-store failures.
    pub async fn set_cover_image(&self, actor: &Actor, id: TourId, bytes: &[u8]) -> Result<Tour> {
        require_role(actor, &TOUR_EDITORS)?;
        let mut tour = self.env.tours.find_by_id(id).await?;
        let name_hint = format!("tour-{id}-cover");
        tour.cover_image = Some(self.env.images.store_image(bytes, &name_hint).await?);
        self.env.tours.update(&tour).await?;
        Ok(tour)
    }

    /// Delete a tour together with its dependent reviews and bookings.
    ///
    /// Dependents go first so a partial failure leaves no orphans pointing
    /// at a missing tour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Forbidden`] for other roles, [`Error::NotFound`]
    /// when absent.
    pub async fn delete(&self, actor: &Actor, id: TourId) -> Result<()> {
        require_role(actor, &TOUR_EDITORS)?;
        // Existence check up front so the cascade never runs for a bad id.
        self.env.tours.find_by_id(id).await?;
        self.env.reviews.delete_by_tour(id).await?;
        self.env.bookings.delete_by_tour(id).await?;
        self.env.tours.delete(id).await
    }

    /// Rating/price stats grouped by difficulty over well-rated tours.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn stats(&self) -> Result<Vec<TourStats>> {
        self.env.tours.stats_by_difficulty().await
    }

    /// Tour starts per month of `year`, busiest months first.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlanEntry>> {
        self.env.tours.monthly_plan(year).await
    }

    /// Every referenced guide must exist and hold a guide role.
    async fn check_guides(&self, guides: &[crate::domain::UserId]) -> Result<()> {
        for guide_id in guides {
            let user = self
                .env
                .users
                .find_by_id(*guide_id)
                .await
                .map_err(|_| Error::validation(format!("guide {guide_id} does not exist")))?;
            if !user.role.is_guide() {
                return Err(Error::validation(format!(
                    "user {guide_id} is not a guide or lead guide"
                )));
            }
        }
        Ok(())
    }
}
