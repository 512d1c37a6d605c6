//! Tour endpoints.

use super::{collection, document};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, ListParams};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use trailbound_core::domain::{NewTour, TourId, TourUpdate};
use trailbound_core::query::QueryPlan;

pub async fn list(State(state): State<AppState>, ListParams(plan): ListParams) -> AppResult<impl IntoResponse> {
    let fields = plan.fields.clone();
    let tours = state.tours.list(plan).await?;
    Ok(collection(&tours, fields.as_deref()))
}

/// The "top 5 cheap" alias: a fixed plan instead of client parameters.
pub async fn top_five_cheap(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plan = QueryPlan::top_five_cheap();
    let fields = plan.fields.clone();
    let tours = state.tours.list(plan).await?;
    Ok(collection(&tours, fields.as_deref()))
}

pub async fn stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = state.tours.stats().await?;
    Ok(collection(&stats, None))
}

pub async fn monthly_plan(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let plan = state.tours.monthly_plan(year).await?;
    Ok(collection(&plan, None))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<TourId>,
) -> AppResult<impl IntoResponse> {
    let tour = state.tours.get(id).await?;
    Ok(document(&tour, None))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<NewTour>,
) -> AppResult<impl IntoResponse> {
    let tour = state.tours.create(&actor, input).await?;
    Ok((StatusCode::CREATED, document(&tour, None)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TourId>,
    Json(patch): Json<TourUpdate>,
) -> AppResult<impl IntoResponse> {
    let tour = state.tours.update(&actor, id, patch).await?;
    Ok(document(&tour, None))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TourId>,
) -> AppResult<impl IntoResponse> {
    state.tours.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_cover_image(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<TourId>,
    body: axum::body::Bytes,
) -> AppResult<impl IntoResponse> {
    let tour = state.tours.set_cover_image(&actor, id, &body).await?;
    Ok(document(&tour, None))
}
