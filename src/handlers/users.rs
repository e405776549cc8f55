// region:    --- Imports
use super::ensure_path_id;
use crate::error::MarketError;
use crate::session::Admin;
use crate::state::AppState;
use crate::users::User;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

// endregion: --- Imports

// region:    --- User Handlers
pub async fn handle_list_users(
    State(state): State<AppState>,
    Admin(_): Admin,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.users().list().await?))
}

pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.users().find(&id).await?.record))
}

/// Open registration. The cart of a new user starts as sent.
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> create user: {}", "Handler", user.username);
    user.validate()?;
    let created = state.users().create(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_replace_user(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(user): Json<User>,
) -> Result<impl IntoResponse, MarketError> {
    ensure_path_id(&id, &user.id)?;
    user.validate()?;
    state.users().find(&id).await?;
    Ok(Json(state.users().replace(&id, user).await?))
}

pub async fn handle_delete_user(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> delete user: {}", "Handler", id);
    state.users().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- User Handlers
