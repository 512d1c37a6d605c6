//! Domain entities: tours, reviews, users, bookings.

mod booking;
mod ids;
mod review;
mod tour;
mod user;

pub use booking::{Booking, BookingUpdate, NewBooking};
pub use ids::{BookingId, ReviewId, TourId, UserId};
pub use review::{NewReview, Review, ReviewUpdate};
pub use tour::{slugify, Difficulty, NewTour, Tour, TourUpdate};
pub use user::{
    validate_email, AdminUserUpdate, ProfileUpdate, Role, Signup, User, PASSWORD_MIN_LEN,
};
