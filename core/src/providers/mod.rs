//! Provider traits: the seams between the functional core and the outside
//! world.
//!
//! Every external effect the services need goes through one of these traits.
//! Production wiring lives in the `trailbound-postgres` and `trailbound-web`
//! crates; `trailbound-testing` supplies in-memory implementations with the
//! same semantics.

mod auth;
mod bookings;
mod images;
mod notifier;
mod payments;
mod reviews;
mod tours;
mod users;

pub use auth::AuthProvider;
pub use bookings::BookingRepository;
pub use images::ImageProcessor;
pub use notifier::{LogNotifier, Notifier};
pub use payments::{CheckoutSession, CompletedCheckout, MockPaymentGateway, PaymentGateway};
pub use reviews::{RatingStats, ReviewRepository};
pub use tours::{MonthlyPlanEntry, TourRepository, TourStats};
pub use users::UserRepository;
