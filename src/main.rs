// region:    --- Imports
use collectables_market::config::Config;
use collectables_market::database::DatabaseManager;
use collectables_market::handlers;
use collectables_market::message_broker::{EventPublisher, KafkaManager, LogPublisher};
use collectables_market::scheduler::AuctionScheduler;
use collectables_market::state::AppState;
use collectables_market::store::{MemoryStore, PostgresStore, RecordStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    if config.uses_default_credentials() {
        warn!(
            "{:<12} --> API_SECRET or ADMIN_PASSWORD is the development default",
            "Main"
        );
    }

    // Record store
    let store: Arc<dyn RecordStore> = match config.database_url.as_deref() {
        Some(url) => {
            let db_manager =
                Arc::new(DatabaseManager::connect(url, config.database_max_connections).await?);
            if let Err(e) = db_manager.initialize_database().await {
                error!("{:<12} --> database initialization failed: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> database ready", "Main");
            Arc::new(PostgresStore::new(db_manager))
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL not set, records are kept in memory",
                "Main"
            );
            Arc::new(MemoryStore::new())
        }
    };

    // Event publisher
    let publisher: Arc<dyn EventPublisher> = match config.kafka_brokers.as_deref() {
        Some(brokers) => {
            let kafka_manager = KafkaManager::new(brokers, &config.kafka_topic)?;
            kafka_manager.create_topic(&config.kafka_topic, 5, 1).await?;
            info!("{:<12} --> Kafka ready", "Main");
            kafka_manager.get_producer()
        }
        None => {
            warn!("{:<12} --> KAFKA_BROKERS not set, events are logged only", "Main");
            Arc::new(LogPublisher)
        }
    };

    let state = AppState::new(&config, store, Arc::clone(&publisher));

    // Closes auctions once their end date passes
    let mut scheduler =
        AuctionScheduler::new(state.auctions(), publisher, config.scheduler_interval).start();

    let routes_all = handlers::router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    scheduler.stop();
    info!("{:<12} --> shut down", "Main");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> failed to listen for ctrl-c: {}", "Main", e);
    }
}
// endregion: --- Main
