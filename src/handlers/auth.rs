// region:    --- Imports
use crate::error::MarketError;
use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};

// endregion: --- Imports

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Exchange the backoffice credentials for an admin session token.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> Result<impl IntoResponse, MarketError> {
    if !state.credentials().matches(&login.username, &login.password) {
        warn!("{:<12} --> login refused for {}", "Auth", login.username);
        return Err(MarketError::Unauthorized);
    }
    let issued = state.sessions().issue(&login.username, true)?;
    info!(
        "{:<12} --> session issued for {} until {}",
        "Auth", login.username, issued.expires_at
    );
    Ok(Json(issued))
}
