//! Review endpoints. All of them require an authenticated caller.

use super::{collection, document};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, ListParams};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use trailbound_core::domain::{NewReview, ReviewId, ReviewUpdate, TourId};

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    ListParams(plan): ListParams,
) -> AppResult<impl IntoResponse> {
    let fields = plan.fields.clone();
    let reviews = state.reviews.list(None, plan).await?;
    Ok(collection(&reviews, fields.as_deref()))
}

pub async fn list_for_tour(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(tour_id): Path<TourId>,
    ListParams(plan): ListParams,
) -> AppResult<impl IntoResponse> {
    let fields = plan.fields.clone();
    let reviews = state.reviews.list(Some(tour_id), plan).await?;
    Ok(collection(&reviews, fields.as_deref()))
}

pub async fn create_for_tour(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(tour_id): Path<TourId>,
    Json(input): Json<NewReview>,
) -> AppResult<impl IntoResponse> {
    let review = state.reviews.create(&actor, tour_id, input).await?;
    Ok((StatusCode::CREATED, document(&review, None)))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    Path(id): Path<ReviewId>,
) -> AppResult<impl IntoResponse> {
    let review = state.reviews.get(id).await?;
    Ok(document(&review, None))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<ReviewId>,
    Json(patch): Json<ReviewUpdate>,
) -> AppResult<impl IntoResponse> {
    let review = state.reviews.update(&actor, id, patch).await?;
    Ok(document(&review, None))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<ReviewId>,
) -> AppResult<impl IntoResponse> {
    state.reviews.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
