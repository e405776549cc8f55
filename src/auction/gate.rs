//! Auction status gate.
//! Proposals enter as `Pending` and wait for an administrator; administrators
//! create auctions directly as `Accepted`. Review is one-way.
// region:    --- Imports
use super::model::{Auction, AuctionState};
use crate::error::MarketError;
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Creation
/// Who is creating the auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationPath {
    /// A storefront user submitting a proposal.
    Proposal,
    /// A backoffice administrator.
    Administrative,
}

impl CreationPath {
    pub fn required_state(self) -> AuctionState {
        match self {
            Self::Proposal => AuctionState::Pending,
            Self::Administrative => AuctionState::Accepted,
        }
    }
}

/// Check a new auction before anything is stored.
pub fn validate_creation(path: CreationPath, auction: &Auction) -> Result<(), MarketError> {
    let required = path.required_state();
    if auction.state != required {
        return Err(MarketError::validation(
            "INVALID_STATUS",
            format!(
                "a new auction on this path must be {required}, got {}",
                auction.state
            ),
        ));
    }

    validate_terms(auction)?;

    if !auction.bids.is_empty() {
        return Err(MarketError::invalid_record(
            "a new auction cannot carry bids",
        ));
    }
    if auction.user_id.trim().is_empty() {
        return Err(MarketError::invalid_record("userId is required"));
    }

    Ok(())
}

/// Name, window and pricing rules shared by creation and replacement.
pub fn validate_terms(auction: &Auction) -> Result<(), MarketError> {
    if auction.name.trim().is_empty() {
        return Err(MarketError::invalid_record("name is required"));
    }
    if auction.start_date >= auction.end_date {
        return Err(MarketError::invalid_record(
            "startDate must be before endDate",
        ));
    }
    if !auction.minimum_bid.is_finite() || auction.minimum_bid < 0.0 {
        return Err(MarketError::invalid_record(
            "minimumBid must be a non-negative number",
        ));
    }
    if !auction.bid_increment.is_finite() || auction.bid_increment <= 0.0 {
        return Err(MarketError::invalid_record(
            "auctionBidIncrement must be positive",
        ));
    }
    Ok(())
}

// endregion: --- Creation

// region:    --- Review
/// Administrative decision on a pending auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl ReviewDecision {
    pub fn target(self) -> AuctionState {
        match self {
            Self::Accept => AuctionState::Accepted,
            Self::Reject => AuctionState::Rejected,
        }
    }
}

/// Apply a review. Only `Pending` auctions can be reviewed.
/// Returns the state the auction was in.
pub fn review(auction: &mut Auction, decision: ReviewDecision) -> Result<AuctionState, MarketError> {
    let from = auction.state;
    if from != AuctionState::Pending {
        return Err(MarketError::validation(
            "INVALID_STATUS",
            format!("only pending auctions can be reviewed, this one is {from}"),
        ));
    }
    auction.state = decision.target();
    Ok(from)
}

/// Whether a replace may move an auction from `from` to `to`.
pub fn allows_transition(from: AuctionState, to: AuctionState) -> bool {
    from == to
        || (from == AuctionState::Pending
            && matches!(to, AuctionState::Accepted | AuctionState::Rejected))
}

// endregion: --- Review

// endregion: --- Tests
