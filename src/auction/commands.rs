//! Auction write commands: creation through the status gate, administrative
//! review, replacement and deletion.
// region:    --- Imports
use super::gate::{self, CreationPath, ReviewDecision};
use super::{Auction, MarketEvent};
use crate::error::MarketError;
use crate::message_broker::EventPublisher;
use crate::store::Repository;
use crate::users::User;
use chrono::{DateTime, Utc};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Commands
/// Create an auction. Validation happens before anything is stored.
pub async fn create_auction(
    path: CreationPath,
    auction: Auction,
    auctions: &Repository<Auction>,
    users: &Repository<User>,
    publisher: &dyn EventPublisher,
    now: DateTime<Utc>,
) -> Result<Auction, MarketError> {
    info!(
        "{:<12} --> create auction ({:?}): {}",
        "Command", path, auction.name
    );
    gate::validate_creation(path, &auction)?;

    if path == CreationPath::Proposal && !users.exists(&auction.user_id).await? {
        return Err(MarketError::NotFound {
            kind: "user",
            id: auction.user_id,
        });
    }

    let mut auction = auction;
    auction.highest_bid = 0.0;
    let created = auctions.create(auction).await?;

    publish(
        publisher,
        MarketEvent::AuctionCreated {
            auction_id: created.id.clone(),
            user_id: created.user_id.clone(),
            state: created.state,
            timestamp: now,
        },
    )
    .await;

    Ok(created)
}

/// Accept or reject a pending auction.
pub async fn review_auction(
    auction_id: &str,
    decision: ReviewDecision,
    auctions: &Repository<Auction>,
    publisher: &dyn EventPublisher,
    now: DateTime<Utc>,
) -> Result<Auction, MarketError> {
    info!(
        "{:<12} --> review auction {}: {:?}",
        "Command", auction_id, decision
    );
    let (auction, from) = auctions
        .update_with(auction_id, |auction: &mut Auction| {
            gate::review(auction, decision)
        })
        .await?;

    publish(
        publisher,
        MarketEvent::AuctionReviewed {
            auction_id: auction.id.clone(),
            from,
            to: auction.state,
            timestamp: now,
        },
    )
    .await;

    Ok(auction)
}

/// Administrative replace. The stored id, the bid ledger and the gate rules win.
pub async fn replace_auction(
    auction_id: &str,
    incoming: Auction,
    auctions: &Repository<Auction>,
) -> Result<Auction, MarketError> {
    info!("{:<12} --> replace auction {}", "Command", auction_id);
    if !incoming.id.is_empty() && incoming.id != auction_id {
        return Err(MarketError::invalid_record(
            "the body id does not match the path id",
        ));
    }
    gate::validate_terms(&incoming)?;

    let (auction, ()) = auctions
        .update_with(auction_id, |stored: &mut Auction| {
            if !gate::allows_transition(stored.state, incoming.state) {
                return Err(MarketError::validation(
                    "INVALID_STATUS",
                    format!(
                        "cannot move an auction from {} to {}",
                        stored.state, incoming.state
                    ),
                ));
            }
            *stored = stored.merge_replacement(incoming.clone());
            Ok(())
        })
        .await?;

    Ok(auction)
}

/// Delete an auction. Allowed for administrators and the owner.
pub async fn delete_auction(
    auction_id: &str,
    admin: bool,
    requested_by: Option<&str>,
    auctions: &Repository<Auction>,
) -> Result<(), MarketError> {
    info!("{:<12} --> delete auction {}", "Command", auction_id);
    if !admin {
        let auction = auctions.find(auction_id).await?.record;
        if requested_by != Some(auction.user_id.as_str()) {
            return Err(MarketError::Forbidden);
        }
    }
    auctions.delete(auction_id).await?;
    Ok(())
}

async fn publish(publisher: &dyn EventPublisher, event: MarketEvent) {
    if let Err(e) = publisher.publish(&event).await {
        error!(
            "{:<12} --> {} not published for {}: {}",
            "Command",
            event.event_type(),
            event.aggregate_id(),
            e
        );
    }
}

// endregion: --- Commands

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::{AuctionState, ProductDetails};
    use crate::message_broker::LogPublisher;
    use crate::store::{MemoryStore, RecordStore};
    use chrono::Duration;
    use std::sync::Arc;

    fn repos() -> (Repository<Auction>, Repository<User>) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        (Repository::new(Arc::clone(&store)), Repository::new(store))
    }

    fn draft(state: AuctionState, owner: &str) -> Auction {
        let now = Utc::now();
        Auction {
            id: String::new(),
            name: "Vintage stamp".to_string(),
            description: String::new(),
            product: ProductDetails::default(),
            minimum_bid: 10.0,
            bid_increment: 1.0,
            highest_bid: 0.0,
            start_date: now,
            end_date: now + Duration::days(1),
            state,
            user_id: owner.to_string(),
            images: vec![],
            bids: vec![],
        }
    }

    async fn add_user(users: &Repository<User>, id: &str) {
        users
            .create(User {
                id: id.to_string(),
                username: id.to_string(),
                email: String::new(),
                first_name: None,
                last_name: None,
                cart: vec![],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_proposal_stores_nothing() {
        let (auctions, users) = repos();
        add_user(&users, "u1").await;

        let err = create_auction(
            CreationPath::Proposal,
            draft(AuctionState::Accepted, "u1"),
            &auctions,
            &users,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
        assert!(auctions.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn proposal_then_review() {
        let (auctions, users) = repos();
        add_user(&users, "u1").await;

        let created = create_auction(
            CreationPath::Proposal,
            draft(AuctionState::Pending, "u1"),
            &auctions,
            &users,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(!created.id.is_empty());

        let accepted = review_auction(
            &created.id,
            ReviewDecision::Accept,
            &auctions,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap();
        assert_eq!(accepted.state, AuctionState::Accepted);

        let again = review_auction(
            &created.id,
            ReviewDecision::Reject,
            &auctions,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(again.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn replace_cannot_unreject() {
        let (auctions, users) = repos();
        add_user(&users, "u1").await;
        let created = create_auction(
            CreationPath::Proposal,
            draft(AuctionState::Pending, "u1"),
            &auctions,
            &users,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap();
        review_auction(
            &created.id,
            ReviewDecision::Reject,
            &auctions,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap();

        let mut incoming = auctions.find(&created.id).await.unwrap().record;
        incoming.state = AuctionState::Accepted;
        let err = replace_auction(&created.id, incoming, &auctions)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn only_owner_or_admin_deletes() {
        let (auctions, users) = repos();
        let created = create_auction(
            CreationPath::Administrative,
            draft(AuctionState::Accepted, "owner"),
            &auctions,
            &users,
            &LogPublisher,
            Utc::now(),
        )
        .await
        .unwrap();

        let err = delete_auction(&created.id, false, Some("intruder"), &auctions)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");

        delete_auction(&created.id, false, Some("owner"), &auctions)
            .await
            .unwrap();
        assert!(auctions.get(&created.id).await.unwrap().is_none());
    }
}
// endregion: --- Tests
