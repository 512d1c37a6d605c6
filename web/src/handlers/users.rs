//! Account endpoints.
//!
//! Login and signup answer with a `token` the client sends back as its
//! bearer credential; what that token is stays the auth provider's
//! business (the development provider uses the account id).

use super::{collection, document};
use crate::error::AppResult;
use crate::extractors::{CurrentUser, ListParams};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use trailbound_core::domain::{AdminUserUpdate, ProfileUpdate, Signup, User, UserId};

fn session_payload(user: &User) -> serde_json::Value {
    json!({
        "status": "success",
        "token": user.id.to_string(),
        "data": user,
    })
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<Signup>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.signup(input).await?;
    Ok((StatusCode::CREATED, Json(session_payload(&user))))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.login(&body.email, &body.password).await?;
    Ok(Json(session_payload(&user)))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordBody>,
) -> AppResult<impl IntoResponse> {
    let reset_base = format!("{}/api/v1/users/reset-password", state.base_url);
    state.users.forgot_password(&body.email, &reset_base).await?;
    Ok(Json(json!({ "status": "success", "message": "token sent to email" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordBody {
    password: String,
    password_confirm: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<ResetPasswordBody>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .reset_password(&token, &body.password, &body.password_confirm)
        .await?;
    Ok(Json(session_payload(&user)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordBody {
    password_current: String,
    password: String,
    password_confirm: String,
}

pub async fn update_my_password(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(body): Json<UpdatePasswordBody>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .update_password(
            &actor,
            &body.password_current,
            &body.password,
            &body.password_confirm,
        )
        .await?;
    Ok(Json(session_payload(&user)))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let user = state.users.me(&actor).await?;
    Ok(document(&user, None))
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(patch): Json<ProfileUpdate>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.update_me(&actor, patch).await?;
    Ok(document(&user, None))
}

pub async fn update_my_photo(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    body: axum::body::Bytes,
) -> AppResult<impl IntoResponse> {
    let user = state.users.update_photo(&actor, &body).await?;
    Ok(document(&user, None))
}

pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> AppResult<impl IntoResponse> {
    state.users.delete_me(&actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ListParams(plan): ListParams,
) -> AppResult<impl IntoResponse> {
    let fields = plan.fields.clone();
    let users = state.users.list(&actor, plan).await?;
    Ok(collection(&users, fields.as_deref()))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.get(&actor, id).await?;
    Ok(document(&user, None))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
    Json(patch): Json<AdminUserUpdate>,
) -> AppResult<impl IntoResponse> {
    let user = state.users.admin_update(&actor, id, patch).await?;
    Ok(document(&user, None))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<UserId>,
) -> AppResult<impl IntoResponse> {
    state.users.admin_delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
