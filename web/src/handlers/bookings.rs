//! Booking and checkout endpoints.

use super::{collection, document};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, ListParams};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use trailbound_core::domain::{BookingId, BookingUpdate, NewBooking, TourId};

const SIGNATURE_HEADER: &str = "x-webhook-signature";

pub async fn checkout_session(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(tour_id): Path<TourId>,
) -> AppResult<impl IntoResponse> {
    let success_url = format!("{}/my-bookings?alert=booking", state.base_url);
    let cancel_url = format!("{}/tours/{tour_id}", state.base_url);
    let session = state
        .bookings
        .checkout_session(&actor, tour_id, &success_url, &cancel_url)
        .await?;
    Ok(Json(json!({ "status": "success", "session": session })))
}

/// Payment provider webhook. Unauthenticated; trust comes from the
/// signature header, verified by the gateway.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    state.bookings.handle_payment_event(&body, signature).await?;
    Ok(Json(json!({ "received": true })))
}

pub async fn my_bookings(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let bookings = state.bookings.my_bookings(&actor).await?;
    Ok(collection(&bookings, None))
}

pub async fn check_booking(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(tour_id): Path<TourId>,
) -> AppResult<impl IntoResponse> {
    let has_booked = state.bookings.has_booked(&actor, tour_id).await?;
    Ok(Json(json!({ "status": "success", "hasBooked": has_booked })))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ListParams(plan): ListParams,
) -> AppResult<impl IntoResponse> {
    let fields = plan.fields.clone();
    let bookings = state.bookings.list(&actor, plan).await?;
    Ok(collection(&bookings, fields.as_deref()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<BookingId>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.get(&actor, id).await?;
    Ok(document(&booking, None))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<NewBooking>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.create(&actor, input).await?;
    Ok((StatusCode::CREATED, document(&booking, None)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<BookingId>,
    Json(patch): Json<BookingUpdate>,
) -> AppResult<impl IntoResponse> {
    let booking = state.bookings.update(&actor, id, patch).await?;
    Ok(document(&booking, None))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<BookingId>,
) -> AppResult<impl IntoResponse> {
    state.bookings.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
