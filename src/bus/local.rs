// src/bus/local.rs
//! In-process bus built on `tokio::sync::broadcast`, one channel per topic.
//!
//! Delivery is at-most-once: a slow subscriber that lags behind the channel
//! capacity loses the oldest messages, and nothing is persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use super::{Message, MessageBus, PublishError};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct LocalBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
    capacity: usize,
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Receive every message published to `channel` after this call.
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<Message> {
        let mut topics = self.topics.lock().unwrap_or_else(|p| p.into_inner());
        topics
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop every topic sender; subscribers see `Closed` once drained.
    pub fn close(&self) {
        self.topics.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

#[async_trait::async_trait]
impl MessageBus for LocalBus {
    async fn publish(&self, channel: &str, message: Message) -> Result<(), PublishError> {
        let sender = {
            let topics = self.topics.lock().map_err(|_| PublishError::Rejected {
                channel: channel.to_string(),
                reason: "bus mutex poisoned".into(),
            })?;
            topics.get(channel).cloned()
        };

        // A topic nobody listens to accepts and drops the message.
        let Some(sender) = sender else {
            tracing::debug!(channel, "publish to topic without subscribers");
            return Ok(());
        };
        if sender.send(message).is_err() {
            tracing::debug!(channel, "all subscribers dropped");
        }
        Ok(())
    }
}
