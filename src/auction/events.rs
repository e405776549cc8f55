use super::model::AuctionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain events published to the message broker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MarketEvent {
    AuctionCreated {
        auction_id: String,
        user_id: String,
        state: AuctionState,
        timestamp: DateTime<Utc>,
    },
    AuctionReviewed {
        auction_id: String,
        from: AuctionState,
        to: AuctionState,
        timestamp: DateTime<Utc>,
    },
    BidPlaced {
        auction_id: String,
        bidder_id: String,
        amount: f64,
        minimum_bid: f64,
        timestamp: DateTime<Utc>,
    },
    AuctionClosed {
        auction_id: String,
        winner_id: Option<String>,
        final_bid: Option<f64>,
        timestamp: DateTime<Utc>,
    },
    OrderPlaced {
        order_id: String,
        user_id: String,
        total: f64,
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Identifier of the record the event is about. Used as the message key.
    pub fn aggregate_id(&self) -> &str {
        match self {
            Self::AuctionCreated { auction_id, .. }
            | Self::AuctionReviewed { auction_id, .. }
            | Self::BidPlaced { auction_id, .. }
            | Self::AuctionClosed { auction_id, .. } => auction_id,
            Self::OrderPlaced { order_id, .. } => order_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::AuctionCreated { .. } => "AuctionCreated",
            Self::AuctionReviewed { .. } => "AuctionReviewed",
            Self::BidPlaced { .. } => "BidPlaced",
            Self::AuctionClosed { .. } => "AuctionClosed",
            Self::OrderPlaced { .. } => "OrderPlaced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = MarketEvent::BidPlaced {
            auction_id: "a1".to_string(),
            bidder_id: "u1".to_string(),
            amount: 10.0,
            minimum_bid: 11.0,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "BidPlaced");
        assert_eq!(json["auctionId"], "a1");
        assert_eq!(json["minimumBid"], 11.0);
        assert_eq!(event.aggregate_id(), "a1");
        assert_eq!(event.event_type(), "BidPlaced");
    }
}
