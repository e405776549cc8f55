//! Bid commands.
//! A bid is a compare-and-append on the auction record: validation runs on the
//! freshest stored copy and the write only lands if nobody else wrote in
//! between. On conflict the whole step is retried.
// region:    --- Imports
use crate::auction::{Auction, Bid, MarketEvent};
use crate::error::MarketError;
use crate::message_broker::EventPublisher;
use crate::store::Repository;
use crate::users::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Commands
/// Place-bid request body.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub bidder_id: String,
    pub amount: f64,
    /// The minimum the bidder was shown. Bids against a moved minimum are refused.
    #[serde(default)]
    pub expected_minimum_bid: Option<f64>,
}

/// Place a bid on `auction_id`.
pub async fn handle_place_bid(
    auction_id: &str,
    cmd: PlaceBidCommand,
    auctions: &Repository<Auction>,
    users: &Repository<User>,
    publisher: &dyn EventPublisher,
    now: DateTime<Utc>,
) -> Result<(Auction, Bid), MarketError> {
    info!(
        "{:<12} --> place bid on {}: {:?}",
        "Command", auction_id, cmd
    );

    if !users.exists(&cmd.bidder_id).await? {
        return Err(MarketError::NotFound {
            kind: "user",
            id: cmd.bidder_id,
        });
    }

    let (auction, bid) = auctions
        .update_with(auction_id, |auction: &mut Auction| {
            auction.place_bid(&cmd.bidder_id, cmd.amount, cmd.expected_minimum_bid, now)
        })
        .await?;

    info!(
        "{:<12} --> bid accepted on {}: amount {} next minimum {}",
        "Command", auction.id, bid.amount, auction.minimum_bid
    );

    let event = MarketEvent::BidPlaced {
        auction_id: auction.id.clone(),
        bidder_id: bid.bidder_id.clone(),
        amount: bid.amount,
        minimum_bid: auction.minimum_bid,
        timestamp: now,
    };
    if let Err(e) = publisher.publish(&event).await {
        error!(
            "{:<12} --> BidPlaced not published for {}: {}",
            "Command", auction.id, e
        );
    }

    Ok((auction, bid))
}

// endregion: --- Commands

// endregion: --- Tests
