// region:    --- Imports
use crate::auction::MarketEvent;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Publisher Trait
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("event encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Destination for domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &MarketEvent) -> Result<(), BrokerError>;
}

/// Publisher used when no broker is configured. Events only reach the log.
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &MarketEvent) -> Result<(), BrokerError> {
        info!(
            "{:<12} --> {} key={}",
            "Event",
            event.event_type(),
            event.aggregate_id()
        );
        Ok(())
    }
}

// endregion: --- Publisher Trait

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
    topic: String,
}

impl KafkaProducer {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
            topic: topic.to_string(),
        })
    }

    /// Send one message
    pub async fn send_message(&self, key: &str, value: &str) -> Result<(), BrokerError> {
        info!(
            "{:<12} --> Kafka send: topic={}, key={}",
            "Producer", self.topic, key
        );
        let record = FutureRecord::to(&self.topic).key(key).payload(value);

        self.producer
            .send(record, Duration::from_secs(0))
            .await
            .map_err(|(e, _)| BrokerError::Kafka(e))?;

        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaProducer {
    async fn publish(&self, event: &MarketEvent) -> Result<(), BrokerError> {
        let payload = serde_json::to_string(event)?;
        self.send_message(event.aggregate_id(), &payload).await
    }
}

// endregion: --- Kafka Producer

// region:    --- Kafka Manager
pub struct KafkaManager {
    producer: Arc<KafkaProducer>,
    brokers: String,
}

impl KafkaManager {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, BrokerError> {
        Ok(KafkaManager {
            producer: Arc::new(KafkaProducer::new(brokers, topic)?),
            brokers: brokers.to_string(),
        })
    }

    /// Shared producer handle
    pub fn get_producer(&self) -> Arc<KafkaProducer> {
        Arc::clone(&self.producer)
    }

    /// Create `topic_name`. An already existing topic is not an error.
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), BrokerError> {
        info!("{:<12} --> Kafka topic create: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka topic ready: {}", "Manager", topic),
                Err((topic, rdkafka::types::RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka topic exists: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!(
                        "{:<12} --> Kafka topic create failed: {} {:?}",
                        "Manager", topic, code
                    );
                    return Err(BrokerError::Kafka(KafkaError::AdminOp(code)));
                }
            }
        }
        Ok(())
    }
}

// endregion: --- Kafka Manager
