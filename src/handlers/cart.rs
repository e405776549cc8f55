// region:    --- Imports
use crate::cart::commands::{add_to_cart, checkout, remove_from_cart, update_cart};
use crate::cart::Line;
use crate::error::MarketError;
use crate::query;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

// endregion: --- Imports

// region:    --- Cart Handlers
pub async fn handle_add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(line): Json<Line>,
) -> Result<impl IntoResponse, MarketError> {
    let lines = add_to_cart(&state.users(), &state.collectables(), &user_id, line).await?;
    Ok(Json(lines))
}

pub async fn handle_update_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(line): Json<Line>,
) -> Result<impl IntoResponse, MarketError> {
    let lines = update_cart(&state.users(), &user_id, line).await?;
    Ok(Json(lines))
}

/// Cart lines with subtotal, shipping and total.
pub async fn handle_get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let view = query::handlers::get_cart(
        &state.users(),
        &state.collectables(),
        &user_id,
        state.shipping(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn handle_remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, collectable_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, MarketError> {
    let lines = remove_from_cart(&state.users(), &user_id, &collectable_id).await?;
    Ok(Json(lines))
}

pub async fn handle_checkout(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    let order = checkout(
        &state.users(),
        &state.collectables(),
        &state.orders(),
        state.publisher(),
        &user_id,
        state.shipping(),
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

// endregion: --- Cart Handlers
