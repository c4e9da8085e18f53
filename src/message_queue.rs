/*!
 * # Message Queue Implementation
 *
 * Topic-addressed job queue used for background mail delivery. Delivery is
 * at-least-once: a consumer acks a message once handled, or nacks it to have
 * it re-queued until `max_retries` is exhausted.
 */

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Message queue errors
#[derive(Error, Debug)]
pub enum MessageQueueError {
    #[error("Queue is full")]
    QueueFull,
    #[error("Unknown message: {0}")]
    UnknownMessage(Uuid),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<redis::RedisError> for MessageQueueError {
    fn from(err: redis::RedisError) -> Self {
        MessageQueueError::ConnectionError(err.to_string())
    }
}

impl From<serde_json::Error> for MessageQueueError {
    fn from(err: serde_json::Error) -> Self {
        MessageQueueError::SerializationError(err.to_string())
    }
}

/// Message envelope for queue items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub topic: String,
    pub payload: serde_json::Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            payload,
            timestamp: chrono::Utc::now(),
            retry_count: 0,
            max_retries: 3,
        }
    }

    fn retried(mut self) -> Option<Self> {
        if self.retry_count >= self.max_retries {
            return None;
        }
        self.retry_count += 1;
        Some(self)
    }
}

/// Message queue trait for different implementations
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn publish(&self, message: Message) -> Result<(), MessageQueueError>;
    async fn subscribe(&self, topic: &str) -> Result<Option<Message>, MessageQueueError>;
    async fn ack(&self, message_id: &Uuid) -> Result<(), MessageQueueError>;
    async fn nack(&self, message_id: &Uuid) -> Result<(), MessageQueueError>;
}

#[derive(Debug, Default)]
struct QueueState {
    topics: HashMap<String, VecDeque<Message>>,
    in_flight: HashMap<Uuid, Message>,
}

/// In-memory message queue implementation
#[derive(Debug, Clone)]
pub struct InMemoryMessageQueue {
    state: Arc<Mutex<QueueState>>,
    max_size: usize,
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            max_size,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, QueueState>, MessageQueueError> {
        self.state
            .lock()
            .map_err(|_| MessageQueueError::ConnectionError("queue lock poisoned".into()))
    }

    /// Number of messages waiting on `topic`.
    pub fn pending(&self, topic: &str) -> usize {
        self.lock()
            .map(|state| state.topics.get(topic).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn publish(&self, message: Message) -> Result<(), MessageQueueError> {
        let mut state = self.lock()?;
        let queue = state.topics.entry(message.topic.clone()).or_default();

        if queue.len() >= self.max_size {
            return Err(MessageQueueError::QueueFull);
        }

        queue.push_back(message);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Option<Message>, MessageQueueError> {
        let mut state = self.lock()?;
        let next = state.topics.get_mut(topic).and_then(VecDeque::pop_front);
        if let Some(message) = &next {
            state.in_flight.insert(message.id, message.clone());
        }
        Ok(next)
    }

    async fn ack(&self, message_id: &Uuid) -> Result<(), MessageQueueError> {
        self.lock()?
            .in_flight
            .remove(message_id)
            .map(|_| ())
            .ok_or(MessageQueueError::UnknownMessage(*message_id))
    }

    async fn nack(&self, message_id: &Uuid) -> Result<(), MessageQueueError> {
        let mut state = self.lock()?;
        let message = state
            .in_flight
            .remove(message_id)
            .ok_or(MessageQueueError::UnknownMessage(*message_id))?;

        match message.retried() {
            Some(message) => {
                state
                    .topics
                    .entry(message.topic.clone())
                    .or_default()
                    .push_back(message);
            }
            None => warn!(%message_id, "message dropped after exhausting retries"),
        }
        Ok(())
    }
}

/// Redis list-backed queue. Each topic is the list `{namespace}:{topic}`;
/// in-flight messages are parked in the hash `{namespace}:inflight` until acked.
#[derive(Clone)]
pub struct RedisMessageQueue {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisMessageQueue {
    pub async fn connect(
        client: redis::Client,
        namespace: impl Into<String>,
    ) -> Result<Self, MessageQueueError> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            namespace: namespace.into(),
        })
    }

    fn topic_key(&self, topic: &str) -> String {
        format!("{}:{}", self.namespace, topic)
    }

    fn inflight_key(&self) -> String {
        format!("{}:inflight", self.namespace)
    }
}

#[async_trait]
impl MessageQueue for RedisMessageQueue {
    async fn publish(&self, message: Message) -> Result<(), MessageQueueError> {
        let body = serde_json::to_string(&message)?;
        let mut conn = self.conn.clone();
        redis::cmd("RPUSH")
            .arg(self.topic_key(&message.topic))
            .arg(body)
            .query_async::<_, i64>(&mut conn)
            .await?;
        debug!(topic = %message.topic, id = %message.id, "message published");
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Option<Message>, MessageQueueError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("LPOP")
            .arg(self.topic_key(topic))
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let message: Message = serde_json::from_str(&raw)?;
        redis::cmd("HSET")
            .arg(self.inflight_key())
            .arg(message.id.to_string())
            .arg(raw)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(Some(message))
    }

    async fn ack(&self, message_id: &Uuid) -> Result<(), MessageQueueError> {
        let mut conn = self.conn.clone();
        redis::cmd("HDEL")
            .arg(self.inflight_key())
            .arg(message_id.to_string())
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn nack(&self, message_id: &Uuid) -> Result<(), MessageQueueError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("HGET")
            .arg(self.inflight_key())
            .arg(message_id.to_string())
            .query_async(&mut conn)
            .await?;
        let raw = raw.ok_or(MessageQueueError::UnknownMessage(*message_id))?;
        self.ack(message_id).await?;

        let message: Message = serde_json::from_str(&raw)?;
        match message.retried() {
            Some(message) => self.publish(message).await,
            None => {
                warn!(%message_id, "message dropped after exhausting retries");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn publish_then_consume_in_order() {
        let queue = InMemoryMessageQueue::new();
        queue
            .publish(Message::new("mail", serde_json::json!({"n": 1})))
            .await
            .unwrap();
        queue
            .publish(Message::new("mail", serde_json::json!({"n": 2})))
            .await
            .unwrap();
        assert_eq!(queue.pending("mail"), 2);

        let first = queue.subscribe("mail").await.unwrap().unwrap();
        assert_eq!(first.payload["n"], 1);
        queue.ack(&first.id).await.unwrap();

        let second = queue.subscribe("mail").await.unwrap().unwrap();
        assert_eq!(second.payload["n"], 2);
        assert!(queue.subscribe("mail").await.unwrap().is_none());
        assert!(queue.subscribe("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nack_requeues_until_retries_run_out() {
        let queue = InMemoryMessageQueue::new();
        let mut message = Message::new("mail", serde_json::json!({}));
        message.max_retries = 1;
        queue.publish(message).await.unwrap();

        let first = queue.subscribe("mail").await.unwrap().unwrap();
        queue.nack(&first.id).await.unwrap();
        let again = queue.subscribe("mail").await.unwrap().unwrap();
        assert_eq!(again.retry_count, 1);

        queue.nack(&again.id).await.unwrap();
        assert_eq!(queue.pending("mail"), 0);
    }

    #[tokio::test]
    async fn full_queue_rejects_publish() {
        let queue = InMemoryMessageQueue::with_max_size(1);
        queue
            .publish(Message::new("mail", serde_json::json!({})))
            .await
            .unwrap();
        assert_matches!(
            queue
                .publish(Message::new("mail", serde_json::json!({})))
                .await,
            Err(MessageQueueError::QueueFull)
        );
    }

    #[tokio::test]
    async fn ack_of_unknown_message_fails() {
        let queue = InMemoryMessageQueue::new();
        assert_matches!(
            queue.ack(&Uuid::new_v4()).await,
            Err(MessageQueueError::UnknownMessage(_))
        );
    }
}
