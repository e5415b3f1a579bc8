// src/bus/mod.rs
//! Message bus abstraction.
//!
//! Messages are small envelopes: a human-readable body plus string attributes.
//! Enrichment requests carry their payload in the `url` attribute only.

pub mod local;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use local::LocalBus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Message {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish to `{channel}` rejected: {reason}")]
    Rejected { channel: String, reason: String },

    #[error("publish exceeded {0:?}")]
    Timeout(Duration),
}

#[async_trait::async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, channel: &str, message: Message) -> Result<(), PublishError>;
}
