//! Orchestrating services: one per aggregate root.
//!
//! Services hold the [`crate::Environment`] plus the shared gate and
//! maintainer, gate every operation through [`crate::policy`], and own the
//! ordering rules (validate, persist, then derived-state triggers).

mod bookings;
mod reviews;
mod tours;
mod users;

pub use bookings::BookingService;
pub use reviews::ReviewService;
pub use tours::TourService;
pub use users::UserService;
