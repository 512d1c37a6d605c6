//! Tour entity and its input types.

use crate::domain::{TourId, UserId};
use crate::error::{Error, Result};
use crate::ratings::DEFAULT_RATINGS_AVERAGE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum tour name length.
pub const NAME_MIN_LEN: usize = 10;
/// Maximum tour name length.
pub const NAME_MAX_LEN: usize = 40;

/// Tour difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Suitable for everyone.
    Easy,
    /// Some hiking experience recommended.
    Medium,
    /// Experienced hikers only.
    Difficult,
}

impl Difficulty {
    /// Canonical lowercase name, as used in the API and the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Difficult => "difficult",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "difficult" => Ok(Self::Difficult),
            other => Err(Error::validation(format!(
                "difficulty is either: easy, medium, difficult (got {other})"
            ))),
        }
    }
}

/// A tour offering.
///
/// `ratings_average` and `ratings_quantity` are derived from the live review
/// set by [`crate::ratings::AggregateMaintainer`] and are never written from
/// client input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    /// Tour id.
    pub id: TourId,
    /// Unique display name, 10-40 characters.
    pub name: String,
    /// URL-friendly slug derived from the name.
    pub slug: String,
    /// Duration in days.
    pub duration: u32,
    /// Maximum group size.
    pub max_group_size: u32,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Derived mean review rating, 1.0-5.0. Defaults to 4.5 with no reviews.
    pub ratings_average: f64,
    /// Derived review count.
    pub ratings_quantity: u32,
    /// Price in cents.
    pub price: i64,
    /// Optional discounted price in cents, strictly below `price`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<i64>,
    /// Short summary.
    pub summary: String,
    /// Long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stored filename of the cover image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    /// Stored filenames of additional images.
    pub images: Vec<String>,
    /// Scheduled start dates.
    pub start_dates: Vec<DateTime<Utc>>,
    /// Guides assigned to this tour (role guide or lead-guide).
    pub guides: Vec<UserId>,
    /// Secret tours are excluded from public listings.
    pub secret: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Tour {
    /// Build a new tour from validated input. Rating fields start at their
    /// schema defaults regardless of anything the client sent.
    #[must_use]
    pub fn new(input: NewTour) -> Self {
        let now = Utc::now();
        let slug = slugify(&input.name);
        Self {
            id: TourId::new(),
            name: input.name,
            slug,
            duration: input.duration,
            max_group_size: input.max_group_size,
            difficulty: input.difficulty,
            ratings_average: DEFAULT_RATINGS_AVERAGE,
            ratings_quantity: 0,
            price: input.price,
            price_discount: input.price_discount,
            summary: input.summary,
            description: input.description,
            cover_image: None,
            images: Vec::new(),
            start_dates: input.start_dates,
            guides: input.guides,
            secret: input.secret,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place, revalidating the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the patched tour violates a schema
    /// constraint.
    pub fn apply(&mut self, patch: TourUpdate) -> Result<()> {
        if let Some(name) = patch.name {
            self.slug = slugify(&name);
            self.name = name;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(max_group_size) = patch.max_group_size {
            self.max_group_size = max_group_size;
        }
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(price_discount) = patch.price_discount {
            self.price_discount = Some(price_discount);
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(start_dates) = patch.start_dates {
            self.start_dates = start_dates;
        }
        if let Some(guides) = patch.guides {
            self.guides = guides;
        }
        if let Some(secret) = patch.secret {
            self.secret = secret;
        }
        self.updated_at = Utc::now();
        self.validate()
    }

    /// Validate schema constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] with the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let name_len = self.name.trim().chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            return Err(Error::validation(format!(
                "a tour name must have between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
            )));
        }
        if self.duration == 0 {
            return Err(Error::validation("a tour must have a duration"));
        }
        if self.max_group_size == 0 {
            return Err(Error::validation("a tour must have a group size"));
        }
        if self.price <= 0 {
            return Err(Error::validation("a tour must have a price"));
        }
        if let Some(discount) = self.price_discount {
            if discount >= self.price {
                return Err(Error::validation(format!(
                    "discount price {discount} should be below regular price"
                )));
            }
        }
        if self.summary.trim().is_empty() {
            return Err(Error::validation("a tour must have a summary"));
        }
        if !(1.0..=5.0).contains(&self.ratings_average) {
            return Err(Error::validation("rating must be between 1.0 and 5.0"));
        }
        Ok(())
    }
}

/// Input for creating a tour.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTour {
    /// Display name.
    pub name: String,
    /// Duration in days.
    pub duration: u32,
    /// Maximum group size.
    pub max_group_size: u32,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Price in cents.
    pub price: i64,
    /// Optional discounted price in cents.
    #[serde(default)]
    pub price_discount: Option<i64>,
    /// Short summary.
    pub summary: String,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start dates.
    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,
    /// Assigned guides.
    #[serde(default)]
    pub guides: Vec<UserId>,
    /// Secret flag.
    #[serde(default)]
    pub secret: bool,
}

/// Partial update for a tour. Absent fields are left untouched. Rating
/// fields are intentionally not representable here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourUpdate {
    /// New name.
    pub name: Option<String>,
    /// New duration in days.
    pub duration: Option<u32>,
    /// New maximum group size.
    pub max_group_size: Option<u32>,
    /// New difficulty.
    pub difficulty: Option<Difficulty>,
    /// New price in cents.
    pub price: Option<i64>,
    /// New discounted price in cents.
    pub price_discount: Option<i64>,
    /// New summary.
    pub summary: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement start dates.
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    /// Replacement guide list.
    pub guides: Option<Vec<UserId>>,
    /// New secret flag.
    pub secret: Option<bool>,
}

/// Lowercase the name and replace runs of non-alphanumeric characters with
/// a single hyphen.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> NewTour {
        NewTour {
            name: "The Forest Hiker".to_string(),
            duration: 5,
            max_group_size: 25,
            difficulty: Difficulty::Easy,
            price: 39_700,
            price_discount: None,
            summary: "Breathtaking hike through the Canadian Banff National Park".to_string(),
            description: None,
            start_dates: Vec::new(),
            guides: Vec::new(),
            secret: false,
        }
    }

    #[test]
    fn new_tour_starts_with_default_ratings() {
        let tour = Tour::new(valid_input());
        assert_eq!(tour.ratings_quantity, 0);
        assert!((tour.ratings_average - 4.5).abs() < f64::EPSILON);
        assert!(tour.validate().is_ok());
    }

    #[test]
    fn slug_is_derived_from_name() {
        let tour = Tour::new(valid_input());
        assert_eq!(tour.slug, "the-forest-hiker");
        assert_eq!(slugify("Sea & Sky: Explorer!"), "sea-sky-explorer");
    }

    #[test]
    fn name_length_is_enforced() {
        let mut tour = Tour::new(valid_input());
        tour.name = "Short".to_string();
        assert!(matches!(tour.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn discount_must_be_below_price() {
        let mut input = valid_input();
        input.price_discount = Some(50_000);
        let tour = Tour::new(input);
        assert!(matches!(tour.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn apply_patch_revalidates() {
        let mut tour = Tour::new(valid_input());
        let err = tour.apply(TourUpdate {
            price: Some(0),
            ..TourUpdate::default()
        });
        assert!(matches!(err, Err(Error::Validation(_))));
    }
}
