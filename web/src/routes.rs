//! Router assembly.

use crate::handlers::{bookings, health, reviews, tours, users};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full API router over the given state.
pub fn router(state: AppState) -> Router {
    let tours = Router::new()
        .route("/", get(tours::list).post(tours::create))
        .route("/top-5-cheap", get(tours::top_five_cheap))
        .route("/tour-stats", get(tours::stats))
        .route("/monthly-plan/:year", get(tours::monthly_plan))
        .route(
            "/:id",
            get(tours::get).patch(tours::update).delete(tours::delete),
        )
        .route("/:id/cover-image", patch(tours::set_cover_image))
        .route(
            "/:tour_id/reviews",
            get(reviews::list_for_tour).post(reviews::create_for_tour),
        );

    let reviews = Router::new().route("/", get(reviews::list)).route(
        "/:id",
        get(reviews::get)
            .patch(reviews::update)
            .delete(reviews::delete),
    );

    let bookings = Router::new()
        .route("/", get(bookings::list).post(bookings::create))
        .route("/checkout-session/:tour_id", post(bookings::checkout_session))
        .route("/webhook", post(bookings::webhook))
        .route("/my-bookings", get(bookings::my_bookings))
        .route("/check-booking/:tour_id", get(bookings::check_booking))
        .route(
            "/:id",
            get(bookings::get)
                .patch(bookings::update)
                .delete(bookings::delete),
        );

    let users = Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/forgot-password", post(users::forgot_password))
        .route("/reset-password/:token", patch(users::reset_password))
        .route("/update-my-password", patch(users::update_my_password))
        .route(
            "/me",
            get(users::me).patch(users::update_me).delete(users::delete_me),
        )
        .route("/me/photo", patch(users::update_my_photo))
        .route("/", get(users::list))
        .route(
            "/:id",
            get(users::get).patch(users::update).delete(users::delete),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1/tours", tours)
        .nest("/api/v1/reviews", reviews)
        .nest("/api/v1/bookings", bookings)
        .nest("/api/v1/users", users)
        .layer(axum::middleware::from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
