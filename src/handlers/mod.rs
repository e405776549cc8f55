// region:    --- Imports
use crate::error::MarketError;
use crate::session::Session;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

pub mod auctions;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

// endregion: --- Imports

// region:    --- Router
/// All API routes with CORS and the body size limit applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth", post(auth::handle_login))
        // auctions
        .route(
            "/api/auctions",
            get(auctions::handle_list_auctions).post(auctions::handle_create_auction),
        )
        .route(
            "/api/auctions/:id",
            get(auctions::handle_get_auction)
                .put(auctions::handle_replace_auction)
                .delete(auctions::handle_delete_auction),
        )
        .route("/api/auctions/:id/accept", post(auctions::handle_accept))
        .route("/api/auctions/:id/reject", post(auctions::handle_reject))
        .route(
            "/api/auctions/:id/bids",
            get(auctions::handle_get_bid_history).post(auctions::handle_bid),
        )
        .route(
            "/api/auctions/:id/highest-bid",
            get(auctions::handle_get_highest_bid),
        )
        .route(
            "/api/auctions/:id/countdown",
            get(auctions::handle_get_countdown),
        )
        // catalog
        .route(
            "/api/collections",
            get(catalog::handle_list_collections).post(catalog::handle_create_collection),
        )
        .route(
            "/api/collections/:id",
            get(catalog::handle_get_collection)
                .put(catalog::handle_replace_collection)
                .delete(catalog::handle_delete_collection),
        )
        .route(
            "/api/collectables",
            get(catalog::handle_list_collectables).post(catalog::handle_create_collectable),
        )
        .route(
            "/api/collectables/:id",
            get(catalog::handle_get_collectable)
                .put(catalog::handle_replace_collectable)
                .delete(catalog::handle_delete_collectable),
        )
        .route(
            "/api/publications",
            get(catalog::handle_list_publications).post(catalog::handle_create_publication),
        )
        .route(
            "/api/publications/:id",
            get(catalog::handle_get_publication)
                .put(catalog::handle_replace_publication)
                .delete(catalog::handle_delete_publication),
        )
        // orders
        .route(
            "/api/orders",
            get(orders::handle_list_orders).post(orders::handle_create_order),
        )
        .route(
            "/api/orders/:id",
            get(orders::handle_get_order)
                .put(orders::handle_replace_order)
                .delete(orders::handle_delete_order),
        )
        // users and carts
        .route(
            "/api/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route(
            "/api/users/:id",
            get(users::handle_get_user)
                .put(users::handle_replace_user)
                .delete(users::handle_delete_user),
        )
        .route("/api/users/addToCart/:user_id", post(cart::handle_add_to_cart))
        .route("/api/users/updateCart/:user_id", put(cart::handle_update_cart))
        .route("/api/users/getCart/:user_id", get(cart::handle_get_cart))
        .route(
            "/api/users/removeFromCart/:user_id/:collectable_id",
            delete(cart::handle_remove_from_cart),
        )
        .route("/api/users/checkout/:user_id", post(cart::handle_checkout))
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 20))
        .with_state(state)
}

// endregion: --- Router

// region:    --- Shared Helpers
/// `?userId=` naming the caller for owner-only operations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: Option<String>,
}

/// True when the optional session carries the admin claim.
pub(crate) fn is_admin(session: &Option<Session>) -> bool {
    session.as_ref().is_some_and(|s| s.admin)
}

/// Admin, or the owner named by `?userId=`.
pub(crate) fn ensure_admin_or_owner(
    session: &Option<Session>,
    owner: &OwnerQuery,
    record_owner: &str,
) -> Result<(), MarketError> {
    if is_admin(session) || owner.user_id.as_deref() == Some(record_owner) {
        Ok(())
    } else if session.is_none() && owner.user_id.is_none() {
        Err(MarketError::Unauthorized)
    } else {
        Err(MarketError::Forbidden)
    }
}

/// A body id, when present, has to match the path id.
pub(crate) fn ensure_path_id(path_id: &str, body_id: &str) -> Result<(), MarketError> {
    if body_id.is_empty() || body_id == path_id {
        Ok(())
    } else {
        Err(MarketError::invalid_record(format!(
            "body id '{body_id}' does not match path id '{path_id}'"
        )))
    }
}

// endregion: --- Shared Helpers
