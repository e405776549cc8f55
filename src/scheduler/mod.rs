//! Auction close scheduler.
//! Accepted auctions whose end date has passed are moved to `Closed` on a
//! fixed tick, and the last bid becomes the winning bid. Bids after the end
//! date are already refused by the bidding path, so the tick interval only
//! bounds how long a finished auction still reads as `Accepted`.
// region:    --- Imports
use crate::auction::{Auction, AuctionState, MarketEvent};
use crate::error::MarketError;
use crate::message_broker::EventPublisher;
use crate::store::Repository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Auction Scheduler
pub struct AuctionScheduler {
    auctions: Repository<Auction>,
    publisher: Arc<dyn EventPublisher>,
    period: Duration,
}

impl AuctionScheduler {
    pub fn new(
        auctions: Repository<Auction>,
        publisher: Arc<dyn EventPublisher>,
        period: Duration,
    ) -> Self {
        Self {
            auctions,
            publisher,
            period,
        }
    }

    /// Spawn the tick loop. The task runs until the handle is stopped or dropped.
    pub fn start(self) -> SchedulerHandle {
        let task = tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match close_ended_auctions(&self.auctions, self.publisher.as_ref(), Utc::now())
                    .await
                {
                    Ok(0) => debug!("{:<12} --> nothing to close", "Scheduler"),
                    Ok(closed) => info!("{:<12} --> closed {} auction(s)", "Scheduler", closed),
                    Err(e) => error!("{:<12} --> close pass failed: {:?}", "Scheduler", e),
                }
            }
        });
        SchedulerHandle { task: Some(task) }
    }
}

/// Close every accepted auction that has ended by `now`. Returns how many closed.
pub async fn close_ended_auctions(
    auctions: &Repository<Auction>,
    publisher: &dyn EventPublisher,
    now: DateTime<Utc>,
) -> Result<usize, MarketError> {
    let due: Vec<Auction> = auctions
        .list()
        .await?
        .into_iter()
        .filter(|auction| auction.state == AuctionState::Accepted && now >= auction.end_date)
        .collect();

    let mut closed = 0;
    for auction in due {
        let (updated, changed) = auctions
            .update_with(&auction.id, |record: &mut Auction| {
                Ok::<_, MarketError>(record.close_if_ended(now))
            })
            .await?;
        if !changed {
            continue;
        }
        closed += 1;

        let winner = updated.last_bid();
        let event = MarketEvent::AuctionClosed {
            auction_id: updated.id.clone(),
            winner_id: winner.map(|bid| bid.bidder_id.clone()),
            final_bid: winner.map(|bid| bid.amount),
            timestamp: now,
        };
        if let Err(e) = publisher.publish(&event).await {
            error!(
                "{:<12} --> event publish failed for auction {}: {}",
                "Scheduler", updated.id, e
            );
        }
    }
    Ok(closed)
}

// endregion: --- Auction Scheduler

// region:    --- Scheduler Handle
/// Owner of the running tick loop.
pub struct SchedulerHandle {
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop the loop. Calling it again does nothing.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("{:<12} --> stopped", "Scheduler");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

// endregion: --- Scheduler Handle

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::{BidStatus, ProductDetails};
    use crate::message_broker::LogPublisher;
    use crate::store::{MemoryStore, RecordStore};
    use chrono::Duration as ChronoDuration;

    fn auction(id: &str, end: DateTime<Utc>, state: AuctionState) -> Auction {
        Auction {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            product: ProductDetails::default(),
            minimum_bid: 10.0,
            bid_increment: 1.0,
            highest_bid: 0.0,
            start_date: end - ChronoDuration::days(1),
            end_date: end,
            state,
            user_id: "seller".to_string(),
            images: vec![],
            bids: vec![],
        }
    }

    #[tokio::test]
    async fn only_ended_accepted_auctions_close() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let auctions = Repository::<Auction>::new(store);
        let now = Utc::now();

        let mut ended = auction("ended", now - ChronoDuration::minutes(1), AuctionState::Accepted);
        ended
            .place_bid("u1", 10.0, None, now - ChronoDuration::hours(1))
            .unwrap();
        auctions.create(ended).await.unwrap();
        auctions
            .create(auction("running", now + ChronoDuration::hours(1), AuctionState::Accepted))
            .await
            .unwrap();
        auctions
            .create(auction("pending", now - ChronoDuration::minutes(1), AuctionState::Pending))
            .await
            .unwrap();

        let closed = close_ended_auctions(&auctions, &LogPublisher, now).await.unwrap();
        assert_eq!(closed, 1);

        let ended = auctions.find("ended").await.unwrap().record;
        assert_eq!(ended.state, AuctionState::Closed);
        assert_eq!(ended.bids[0].status, BidStatus::WinningBid);
        assert_eq!(
            auctions.find("running").await.unwrap().record.state,
            AuctionState::Accepted
        );
        assert_eq!(
            auctions.find("pending").await.unwrap().record.state,
            AuctionState::Pending
        );

        assert_eq!(close_ended_auctions(&auctions, &LogPublisher, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let scheduler = AuctionScheduler::new(
            Repository::new(store),
            Arc::new(LogPublisher),
            Duration::from_millis(10),
        );
        let mut handle = scheduler.start();
        assert!(handle.is_running());

        handle.stop();
        handle.stop();
        assert!(!handle.is_running());
    }
}
// endregion: --- Tests
