use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use shared::{EmailNotificationMessage, StateChangeMessage};
use std::time::Duration;
use tracing::info;
use crate::error::{PaymentError, Result};
use crate::hooks::EmailOption;
use crate::models::RequestState;

/// Outbound side of the names queues. Delivery guarantees belong to the implementation.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn send_state_change_message(&self, nr_num: &str, new_state: RequestState, old_state: RequestState) -> Result<()>;

    async fn publish_email_notification(&self, nr_num: &str, option: EmailOption) -> Result<()>;
}

pub struct KafkaPublisher {
    producer: FutureProducer,
    state_topic: String,
    email_topic: String,
    source: String,
}

impl KafkaPublisher {
    pub fn new(producer: FutureProducer, state_topic: String, email_topic: String, source: String) -> Self {
        Self { producer, state_topic, email_topic, source }
    }
}

/// Serializes `message` as JSON and waits for the broker to acknowledge it.
pub async fn send_json<T: Serialize + ?Sized>(producer: &FutureProducer, topic: &str, key: &str, message: &T) -> Result<()> {
    let json = serde_json::to_string(message)?;
    let record = FutureRecord::to(topic)
        .payload(&json)
        .key(key);

    producer.send(record, Duration::from_secs(5)).await
        .map_err(|(e, _)| PaymentError::Publish {
            topic: topic.to_string(),
            reason: e.to_string(),
        })?;

    Ok(())
}

#[async_trait]
impl NotificationPublisher for KafkaPublisher {
    async fn send_state_change_message(&self, nr_num: &str, new_state: RequestState, old_state: RequestState) -> Result<()> {
        let message = StateChangeMessage::state_change(&self.source, nr_num, new_state.as_str(), old_state.as_str());
        send_json(&self.producer, &self.state_topic, nr_num, &message).await?;
        info!("Published state change {} -> {} for {}", old_state, new_state, nr_num);
        Ok(())
    }

    async fn publish_email_notification(&self, nr_num: &str, option: EmailOption) -> Result<()> {
        let message = EmailNotificationMessage::email(&self.source, nr_num, option.as_str());
        send_json(&self.producer, &self.email_topic, nr_num, &message).await?;
        info!("Published {} email notification for {}", option.as_str(), nr_num);
        Ok(())
    }
}
