use crate::error::MarketError;
use crate::store::{Resource, ResourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Bid amounts closer than this are treated as equal.
const AMOUNT_EPSILON: f64 = 1e-9;

/// Review and lifecycle state of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionState {
    Pending,
    Accepted,
    Rejected,
    /// The end timestamp passed while accepted. Set by the scheduler.
    Closed,
}

impl AuctionState {
    /// Visible to storefront visitors.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Accepted | Self::Closed)
    }
}

impl std::fmt::Display for AuctionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Closed => "Closed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    #[serde(rename = "Highest Bid")]
    HighestBid,
    #[serde(rename = "Winning Bid")]
    WinningBid,
    #[serde(rename = "Outbidded")]
    Outbidded,
}

/// One offer against an auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub bidder_id: String,
    pub status: BidStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
}

/// A timed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product: ProductDetails,
    pub minimum_bid: f64,
    #[serde(rename = "auctionBidIncrement")]
    pub bid_increment: f64,
    #[serde(default)]
    pub highest_bid: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(rename = "auctionState")]
    pub state: AuctionState,
    pub user_id: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub bids: Vec<Bid>,
}

impl Resource for Auction {
    const KIND: ResourceKind = ResourceKind::Auctions;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Auction {
    /// The current highest bid is the most recent one, not the largest.
    pub fn last_bid(&self) -> Option<&Bid> {
        self.bids.last()
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.state == AuctionState::Closed || now >= self.end_date
    }

    /// Validate a bid against the current record and append it.
    ///
    /// `expected_minimum` is the minimum the bidder saw. When given, the bid
    /// is refused if the stored minimum has moved since.
    pub fn place_bid(
        &mut self,
        bidder_id: &str,
        amount: f64,
        expected_minimum: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<Bid, MarketError> {
        match self.state {
            AuctionState::Accepted => {}
            AuctionState::Closed => {
                return Err(MarketError::validation(
                    "ALREADY_ENDED",
                    "the auction has already ended",
                ))
            }
            state => {
                return Err(MarketError::validation(
                    "INVALID_STATUS",
                    format!("bids are not accepted while the auction is {state}"),
                ))
            }
        }

        if !self.has_started(now) {
            return Err(MarketError::validation(
                "NOT_STARTED",
                "the auction has not started yet",
            ));
        }
        if self.has_ended(now) {
            return Err(MarketError::validation(
                "ALREADY_ENDED",
                "the auction has already ended",
            ));
        }

        if let Some(expected) = expected_minimum {
            if (expected - self.minimum_bid).abs() > AMOUNT_EPSILON {
                return Err(MarketError::StaleMinimum {
                    expected,
                    current: self.minimum_bid,
                });
            }
        }

        if !amount.is_finite() || amount + AMOUNT_EPSILON < self.minimum_bid {
            return Err(MarketError::validation(
                "LOW_BID",
                format!("the bid must be at least {}", self.minimum_bid),
            ));
        }

        if let Some(previous) = self.bids.last_mut() {
            previous.status = BidStatus::Outbidded;
        }

        let bid = Bid {
            amount,
            timestamp: now,
            bidder_id: bidder_id.to_string(),
            status: BidStatus::HighestBid,
        };
        self.bids.push(bid.clone());
        self.highest_bid = amount;
        self.minimum_bid = amount + self.bid_increment;

        Ok(bid)
    }

    /// Move an accepted auction past its end date into `Closed`, marking the
    /// last bid as the winner. Returns false when nothing changed.
    pub fn close_if_ended(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != AuctionState::Accepted || now < self.end_date {
            return false;
        }
        self.state = AuctionState::Closed;
        if let Some(last) = self.bids.last_mut() {
            last.status = BidStatus::WinningBid;
        }
        true
    }

    /// Apply an administrative replace on top of the stored record.
    ///
    /// The bid ledger belongs to the bidding path: `bids` and `highestBid`
    /// are kept from the stored copy, and the pricing fields are frozen once
    /// a bid exists.
    pub fn merge_replacement(&self, mut incoming: Auction) -> Auction {
        incoming.id = self.id.clone();
        incoming.bids = self.bids.clone();
        incoming.highest_bid = self.highest_bid;
        if !self.bids.is_empty() {
            incoming.minimum_bid = self.minimum_bid;
            incoming.bid_increment = self.bid_increment;
        }
        incoming
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn open_auction(now: DateTime<Utc>) -> Auction {
        Auction {
            id: "a1".to_string(),
            name: "Base Set Charizard".to_string(),
            description: "Holo".to_string(),
            product: ProductDetails::default(),
            minimum_bid: 100.0,
            bid_increment: 10.0,
            highest_bid: 0.0,
            start_date: now - Duration::hours(1),
            end_date: now + Duration::hours(1),
            state: AuctionState::Accepted,
            user_id: "seller".to_string(),
            images: vec![],
            bids: vec![],
        }
    }

    #[test]
    fn accepted_bid_moves_minimum_by_increment() {
        let now = Utc::now();
        let mut auction = open_auction(now);

        let bid = auction.place_bid("u1", 120.0, None, now).unwrap();

        assert_eq!(bid.status, BidStatus::HighestBid);
        assert_eq!(auction.highest_bid, 120.0);
        assert_eq!(auction.minimum_bid, 130.0);
        assert_eq!(auction.bids.len(), 1);
    }

    #[test]
    fn bid_below_minimum_leaves_auction_untouched() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        let before = auction.clone();

        let err = auction.place_bid("u1", 99.99, None, now).unwrap_err();

        assert_eq!(err.code(), "LOW_BID");
        assert_eq!(auction, before);
    }

    #[test]
    fn bid_equal_to_minimum_is_accepted() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        assert!(auction.place_bid("u1", 100.0, None, now).is_ok());
    }

    #[test]
    fn previous_bid_is_marked_outbidded() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.place_bid("u1", 100.0, None, now).unwrap();
        auction.place_bid("u2", 110.0, None, now).unwrap();

        assert_eq!(auction.bids[0].status, BidStatus::Outbidded);
        assert_eq!(auction.bids[1].status, BidStatus::HighestBid);
        assert_eq!(auction.last_bid().unwrap().bidder_id, "u2");
    }

    #[test]
    fn stale_minimum_is_rejected() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.place_bid("u1", 100.0, Some(100.0), now).unwrap();

        let err = auction
            .place_bid("u2", 150.0, Some(100.0), now)
            .unwrap_err();
        assert!(matches!(err, MarketError::StaleMinimum { current, .. } if current == 110.0));
    }

    #[test]
    fn bids_outside_the_window_are_refused() {
        let now = Utc::now();
        let mut auction = open_auction(now);

        let early = now - Duration::hours(2);
        assert_eq!(
            auction.place_bid("u1", 200.0, None, early).unwrap_err().code(),
            "NOT_STARTED"
        );

        let late = now + Duration::hours(2);
        assert_eq!(
            auction.place_bid("u1", 200.0, None, late).unwrap_err().code(),
            "ALREADY_ENDED"
        );
    }

    #[test]
    fn pending_auction_takes_no_bids() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.state = AuctionState::Pending;
        assert_eq!(
            auction.place_bid("u1", 200.0, None, now).unwrap_err().code(),
            "INVALID_STATUS"
        );
    }

    #[test]
    fn non_finite_amounts_are_low_bids() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        assert_eq!(
            auction.place_bid("u1", f64::NAN, None, now).unwrap_err().code(),
            "LOW_BID"
        );
    }

    #[test]
    fn closing_marks_the_winner() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.place_bid("u1", 100.0, None, now).unwrap();
        auction.place_bid("u2", 110.0, None, now).unwrap();

        assert!(!auction.close_if_ended(now));
        assert!(auction.close_if_ended(now + Duration::hours(2)));
        assert_eq!(auction.state, AuctionState::Closed);
        assert_eq!(auction.bids[1].status, BidStatus::WinningBid);
        assert!(!auction.close_if_ended(now + Duration::hours(3)));
    }

    #[test]
    fn replacement_keeps_the_bid_ledger() {
        let now = Utc::now();
        let mut stored = open_auction(now);
        stored.place_bid("u1", 100.0, None, now).unwrap();

        let mut incoming = stored.clone();
        incoming.id = "other".to_string();
        incoming.name = "Renamed".to_string();
        incoming.bids.clear();
        incoming.highest_bid = 0.0;
        incoming.minimum_bid = 1.0;

        let merged = stored.merge_replacement(incoming);
        assert_eq!(merged.id, "a1");
        assert_eq!(merged.name, "Renamed");
        assert_eq!(merged.bids, stored.bids);
        assert_eq!(merged.highest_bid, 100.0);
        assert_eq!(merged.minimum_bid, 110.0);
    }

    #[test]
    fn wire_format_uses_source_field_names() {
        let now = Utc::now();
        let mut auction = open_auction(now);
        auction.place_bid("u1", 100.0, None, now).unwrap();
        let json = serde_json::to_value(&auction).unwrap();

        assert_eq!(json["auctionState"], "Accepted");
        assert_eq!(json["auctionBidIncrement"], 10.0);
        assert_eq!(json["minimumBid"], 110.0);
        assert_eq!(json["bids"][0]["status"], "Highest Bid");
        assert_eq!(json["bids"][0]["bidderId"], "u1");
    }

    #[test]
    fn underscore_id_is_accepted_on_input() {
        let json = serde_json::json!({
            "_id": "abc",
            "name": "n",
            "minimumBid": 1.0,
            "auctionBidIncrement": 1.0,
            "startDate": "2026-01-01T00:00:00Z",
            "endDate": "2026-01-02T00:00:00Z",
            "auctionState": "Pending",
            "userId": "u"
        });
        let auction: Auction = serde_json::from_value(json).unwrap();
        assert_eq!(auction.id, "abc");
        assert!(auction.bids.is_empty());
    }
}
// endregion: --- Tests
