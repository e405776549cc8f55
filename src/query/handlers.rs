// region:    --- Imports
use crate::auction::countdown::Countdown;
use crate::auction::{Auction, AuctionState, Bid};
use crate::cart::{CartSummary, CartView, ShippingPolicy};
use crate::catalog::{filter_by_query, Collectable, Collection, Publication};
use crate::error::MarketError;
use crate::orders::Order;
use crate::store::Repository;
use crate::users::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

// region:    --- Filters
/// Query string for `GET /api/auctions`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionFilter {
    pub q: Option<String>,
    pub state: Option<AuctionState>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectableFilter {
    pub q: Option<String>,
    pub collection_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationFilter {
    pub q: Option<String>,
    pub user_id: Option<String>,
    /// `Sale` or `Display`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub user_id: Option<String>,
}

// endregion: --- Filters

// region:    --- Query Handlers

/// Auction listing. Pending and rejected auctions are only shown to
/// administrators, or to their owner when the listing is filtered by owner.
pub async fn list_auctions(
    auctions: &Repository<Auction>,
    filter: &AuctionFilter,
    admin: bool,
) -> Result<Vec<Auction>, MarketError> {
    info!("{:<12} --> list auctions: {:?}", "Query", filter);
    let all = auctions.list().await?;
    let visible = all
        .into_iter()
        .filter(|a| filter.state.map_or(true, |state| a.state == state))
        .filter(|a| {
            filter
                .user_id
                .as_deref()
                .map_or(true, |owner| a.user_id == owner)
        })
        .filter(|a| admin || a.state.is_public() || filter.user_id.is_some())
        .collect();
    Ok(filter_by_query(visible, filter.q.as_deref()))
}

/// A single auction. Unreviewed auctions are hidden from the public.
pub async fn get_auction(
    auctions: &Repository<Auction>,
    auction_id: &str,
    admin: bool,
    requested_by: Option<&str>,
) -> Result<Auction, MarketError> {
    info!("{:<12} --> get auction id: {}", "Query", auction_id);
    let auction = auctions.find(auction_id).await?.record;
    if admin || auction.state.is_public() || requested_by == Some(auction.user_id.as_str()) {
        Ok(auction)
    } else {
        Err(MarketError::NotFound {
            kind: "auction",
            id: auction_id.to_string(),
        })
    }
}

/// Bid history, oldest first.
pub async fn get_bid_history(
    auctions: &Repository<Auction>,
    auction_id: &str,
    admin: bool,
    requested_by: Option<&str>,
) -> Result<Vec<Bid>, MarketError> {
    info!("{:<12} --> bid history id: {}", "Query", auction_id);
    Ok(get_auction(auctions, auction_id, admin, requested_by)
        .await?
        .bids)
}

/// Current price view of an auction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighestBid {
    pub auction_id: String,
    pub highest_bid: f64,
    pub minimum_bid: f64,
    pub bidder_id: Option<String>,
}

pub async fn get_highest_bid(
    auctions: &Repository<Auction>,
    auction_id: &str,
    admin: bool,
    requested_by: Option<&str>,
) -> Result<HighestBid, MarketError> {
    info!("{:<12} --> highest bid id: {}", "Query", auction_id);
    let auction = get_auction(auctions, auction_id, admin, requested_by).await?;
    Ok(HighestBid {
        bidder_id: auction.last_bid().map(|bid| bid.bidder_id.clone()),
        auction_id: auction.id,
        highest_bid: auction.highest_bid,
        minimum_bid: auction.minimum_bid,
    })
}

pub async fn get_countdown(
    auctions: &Repository<Auction>,
    auction_id: &str,
    admin: bool,
    requested_by: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Countdown, MarketError> {
    let auction = get_auction(auctions, auction_id, admin, requested_by).await?;
    Ok(Countdown::evaluate(auction.start_date, auction.end_date, now))
}

pub async fn list_collections(
    collections: &Repository<Collection>,
    q: Option<&str>,
) -> Result<Vec<Collection>, MarketError> {
    info!("{:<12} --> list collections", "Query");
    Ok(filter_by_query(collections.list().await?, q))
}

pub async fn list_collectables(
    collectables: &Repository<Collectable>,
    filter: &CollectableFilter,
) -> Result<Vec<Collectable>, MarketError> {
    info!("{:<12} --> list collectables: {:?}", "Query", filter);
    let matching = collectables
        .list()
        .await?
        .into_iter()
        .filter(|c| match filter.collection_id.as_deref() {
            Some(collection) => c.collection_id.as_deref() == Some(collection),
            None => true,
        })
        .collect();
    Ok(filter_by_query(matching, filter.q.as_deref()))
}

pub async fn list_publications(
    publications: &Repository<Publication>,
    filter: &PublicationFilter,
) -> Result<Vec<Publication>, MarketError> {
    info!("{:<12} --> list publications: {:?}", "Query", filter);
    let matching = publications
        .list()
        .await?
        .into_iter()
        .filter(|p| {
            filter
                .user_id
                .as_deref()
                .map_or(true, |owner| p.user_id == owner)
        })
        .filter(|p| {
            filter
                .kind
                .as_deref()
                .map_or(true, |kind| p.kind.label().eq_ignore_ascii_case(kind))
        })
        .collect();
    Ok(filter_by_query(matching, filter.q.as_deref()))
}

/// Orders, newest first.
pub async fn list_orders(
    orders: &Repository<Order>,
    filter: &OrderFilter,
) -> Result<Vec<Order>, MarketError> {
    info!("{:<12} --> list orders: {:?}", "Query", filter);
    let mut matching: Vec<Order> = orders
        .list()
        .await?
        .into_iter()
        .filter(|o| {
            filter
                .user_id
                .as_deref()
                .map_or(true, |owner| o.user_id == owner)
        })
        .collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(matching)
}

/// Cart lines with totals priced against the current catalog.
pub async fn get_cart(
    users: &Repository<User>,
    collectables: &Repository<Collectable>,
    user_id: &str,
    policy: &ShippingPolicy,
) -> Result<CartView, MarketError> {
    info!("{:<12} --> get cart user: {}", "Query", user_id);
    let user = users.find(user_id).await?.record;
    let catalog = collectables.list().await?;
    let summary = CartSummary::compute(&user.cart, &catalog, policy);
    Ok(CartView {
        lines: user.cart,
        summary,
    })
}

// endregion: --- Query Handlers

// endregion: --- Tests
