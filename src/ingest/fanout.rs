// src/ingest/fanout.rs
//! One enrichment request per capability, published sequentially.
//!
//! The first failed publish stops the sequence. Requests already sent stay
//! sent; nothing is retried or recalled.

use std::sync::Arc;

use metrics::counter;

use crate::analysis::EnrichmentKind;
use crate::bus::{Message, MessageBus, PublishError};
use crate::config::ChannelConfig;
use crate::error::PipelineError;
use crate::model::ArticleUrl;

const REQUEST_BODY: &str = "Process new URL";
pub const URL_ATTRIBUTE: &str = "url";

/// The bus payload for one enrichment: just the article url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub url: ArticleUrl,
}

impl EnrichmentRequest {
    pub fn to_message(&self) -> Message {
        Message::new(REQUEST_BODY).with_attribute(URL_ATTRIBUTE, self.url.as_str())
    }

    /// Read the `url` attribute; missing or malformed urls are validation errors.
    pub fn from_message(message: &Message) -> Result<Self, PipelineError> {
        let url = ArticleUrl::parse(message.attribute(URL_ATTRIBUTE))?;
        Ok(Self { url })
    }
}

#[derive(Clone)]
pub struct FanOutPublisher {
    bus: Arc<dyn MessageBus>,
    channels: ChannelConfig,
}

impl FanOutPublisher {
    pub fn new(bus: Arc<dyn MessageBus>, channels: ChannelConfig) -> Self {
        Self { bus, channels }
    }

    pub fn channels(&self) -> &ChannelConfig {
        &self.channels
    }

    /// Publish concepts, language, sentiment, statistics requests in that order.
    /// Returns how many were published (always four on success).
    pub async fn publish_enrichment_requests(
        &self,
        url: &ArticleUrl,
    ) -> Result<usize, PublishError> {
        let request = EnrichmentRequest { url: url.clone() };
        let mut sent = 0;
        for kind in EnrichmentKind::ALL {
            let channel = self.channels.channel(kind);
            if let Err(e) = self.bus.publish(channel, request.to_message()).await {
                tracing::warn!(
                    url = %url,
                    channel,
                    sent,
                    error = %e,
                    "fan-out aborted"
                );
                return Err(e);
            }
            counter!("enrichment_requests_published_total", "kind" => kind.as_str()).increment(1);
            sent += 1;
        }
        Ok(sent)
    }
}
