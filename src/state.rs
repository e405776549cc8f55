// region:    --- Imports
use crate::auction::{Auction, MarketEvent};
use crate::cart::ShippingPolicy;
use crate::catalog::{Collectable, Collection, Publication};
use crate::config::Config;
use crate::message_broker::EventPublisher;
use crate::orders::Order;
use crate::session::{Credentials, SessionKeys};
use crate::store::{RecordStore, Repository};
use crate::users::User;
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::error;

// endregion: --- Imports

// region:    --- App State
/// Shared handles passed to every request handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn RecordStore>,
    publisher: Arc<dyn EventPublisher>,
    sessions: SessionKeys,
    credentials: Arc<Credentials>,
    shipping: ShippingPolicy,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store,
            publisher,
            sessions: SessionKeys::new(&config.api_secret, config.session_ttl),
            credentials: Arc::new(Credentials {
                username: config.admin_username.clone(),
                password: config.admin_password.clone(),
            }),
            shipping: config.shipping,
        }
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn auctions(&self) -> Repository<Auction> {
        Repository::new(self.store())
    }

    pub fn collectables(&self) -> Repository<Collectable> {
        Repository::new(self.store())
    }

    pub fn collections(&self) -> Repository<Collection> {
        Repository::new(self.store())
    }

    pub fn publications(&self) -> Repository<Publication> {
        Repository::new(self.store())
    }

    pub fn orders(&self) -> Repository<Order> {
        Repository::new(self.store())
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.store())
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn shipping(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// Publish after a committed write. Failures are logged, not returned.
    pub async fn publish(&self, event: MarketEvent) {
        if let Err(e) = self.publisher.publish(&event).await {
            error!(
                "{:<12} --> event {} for {} not published: {}",
                "Event",
                event.event_type(),
                event.aggregate_id(),
                e
            );
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

// endregion: --- App State
