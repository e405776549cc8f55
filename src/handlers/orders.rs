// region:    --- Imports
use super::{ensure_path_id, is_admin};
use crate::auction::MarketEvent;
use crate::cart::Line;
use crate::error::MarketError;
use crate::orders::Order;
use crate::query::{self, OrderFilter};
use crate::session::{Admin, MaybeSession};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

/// Body of `POST /api/orders`. Prices come from the catalog, never the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub lines: Vec<Line>,
}

// region:    --- Order Handlers

/// Every order for administrators; a user's own orders with `?userId=`.
pub async fn handle_list_orders(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, MarketError> {
    if filter.user_id.is_none() && !is_admin(&session) {
        return Err(match session {
            Some(_) => MarketError::Forbidden,
            None => MarketError::Unauthorized,
        });
    }
    Ok(Json(query::handlers::list_orders(&state.orders(), &filter).await?))
}

pub async fn handle_get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    Ok(Json(state.orders().find(&id).await?.record))
}

pub async fn handle_create_order(
    State(state): State<AppState>,
    Json(new_order): Json<NewOrder>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> create order for {}", "Handler", new_order.user_id);
    if !state.users().exists(&new_order.user_id).await? {
        return Err(MarketError::NotFound {
            kind: "user",
            id: new_order.user_id,
        });
    }

    let now = Utc::now();
    let catalog = state.collectables().list().await?;
    let order = Order::price_lines(
        &new_order.user_id,
        &new_order.lines,
        &catalog,
        state.shipping(),
        now,
    )?;
    let order = state.orders().create(order).await?;

    state
        .publish(MarketEvent::OrderPlaced {
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            total: order.total,
            timestamp: now,
        })
        .await;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Backoffice edit, e.g. moving an order to `Shipped`.
pub async fn handle_replace_order(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
    Json(mut order): Json<Order>,
) -> Result<impl IntoResponse, MarketError> {
    ensure_path_id(&id, &order.id)?;
    order.created_at = state.orders().find(&id).await?.record.created_at;
    Ok(Json(state.orders().replace(&id, order).await?))
}

pub async fn handle_delete_order(
    State(state): State<AppState>,
    Admin(_): Admin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, MarketError> {
    info!("{:<12} --> delete order: {}", "Handler", id);
    state.orders().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// endregion: --- Order Handlers
