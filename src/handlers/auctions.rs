// region:    --- Imports
use super::{is_admin, OwnerQuery};
use crate::auction::commands::{create_auction, delete_auction, replace_auction, review_auction};
use crate::auction::gate::{CreationPath, ReviewDecision};
use crate::auction::Auction;
use crate::bidding::{handle_place_bid, PlaceBidCommand};
use crate::error::MarketError;
use crate::query::{self, AuctionFilter};
use crate::session::{Admin, MaybeSession};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers
pub async fn handle_list_auctions(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Query(filter): Query<AuctionFilter>,
) -> Result<impl IntoResponse, MarketError> {
    let auctions =
        query::handlers::list_auctions(&state.auctions(), &filter, is_admin(&session)).await?;
    Ok(Json(auctions))
}

pub async fn handle_get_auction(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let auction = query::handlers::get_auction(
        &state.auctions(),
        &id,
        is_admin(&session),
        owner.user_id.as_deref(),
    )
    .await?;
    Ok(Json(auction))
}

pub async fn handle_get_bid_history(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let bids = query::handlers::get_bid_history(
        &state.auctions(),
        &id,
        is_admin(&session),
        owner.user_id.as_deref(),
    )
    .await?;
    Ok(Json(bids))
}

pub async fn handle_get_highest_bid(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let highest = query::handlers::get_highest_bid(
        &state.auctions(),
        &id,
        is_admin(&session),
        owner.user_id.as_deref(),
    )
    .await?;
    Ok(Json(highest))
}

pub async fn handle_get_countdown(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    let countdown = query::handlers::get_countdown(
        &state.auctions(),
        &id,
        is_admin(&session),
        owner.user_id.as_deref(),
        Utc::now(),
    )
    .await?;
    Ok(Json(countdown))
}

// endregion: --- Query Handlers

// region:    --- Command Handlers

/// Administrators create accepted auctions; everyone else submits a pending proposal.
pub async fn handle_create_auction(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Json(auction): Json<Auction>,
) -> Result<impl IntoResponse, MarketError> {
    let path = if is_admin(&session) {
        CreationPath::Administrative
    } else {
        CreationPath::Proposal
    };
    let created = create_auction(
        path,
        auction,
        &state.auctions(),
        &state.users(),
        state.publisher(),
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_replace_auction(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(auction): Json<Auction>,
) -> Result<impl IntoResponse, MarketError> {
    let replaced = replace_auction(&id, auction, &state.auctions()).await?;
    Ok(Json(replaced))
}

pub async fn handle_delete_auction(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Query(owner): Query<OwnerQuery>,
) -> Result<impl IntoResponse, MarketError> {
    if session.is_none() && owner.user_id.is_none() {
        return Err(MarketError::Unauthorized);
    }
    delete_auction(
        &id,
        is_admin(&session),
        owner.user_id.as_deref(),
        &state.auctions(),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_accept(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> accept {} by {}", "Handler", id, admin.subject);
    let auction = review_auction(
        &id,
        ReviewDecision::Accept,
        &state.auctions(),
        state.publisher(),
        Utc::now(),
    )
    .await?;
    Ok(Json(auction))
}

pub async fn handle_reject(
    State(state): State<AppState>,
    Admin(admin): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> reject {} by {}", "Handler", id, admin.subject);
    let auction = review_auction(
        &id,
        ReviewDecision::Reject,
        &state.auctions(),
        state.publisher(),
        Utc::now(),
    )
    .await?;
    Ok(Json(auction))
}

/// Place a bid. The response carries the new price so clients can refresh.
pub async fn handle_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse, MarketError> {
    let (auction, bid) = handle_place_bid(
        &id,
        cmd,
        &state.auctions(),
        &state.users(),
        state.publisher(),
        Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "bid": bid,
            "highestBid": auction.highest_bid,
            "minimumBid": auction.minimum_bid,
        })),
    ))
}

// endregion: --- Command Handlers
