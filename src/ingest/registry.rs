// src/ingest/registry.rs
use std::sync::Arc;

use metrics::counter;

use crate::model::{NewsSource, StoredEntity};
use crate::store::{RecordStore, StoreError, Table};

/// Idempotent creation of one `newsSource` record per hostname.
#[derive(Clone)]
pub struct SourceRegistry {
    store: Arc<dyn RecordStore>,
}

impl SourceRegistry {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create the source record for `hostname` unless it exists.
    /// Returns `true` when a record was written.
    pub async fn ensure_source(&self, hostname: &str) -> Result<bool, StoreError> {
        if self.store.get(Table::NewsSource, hostname).await?.is_some() {
            return Ok(false);
        }

        let source = NewsSource {
            url: hostname.to_string(),
        };
        self.store.put(Table::NewsSource, source.to_record()?).await?;
        counter!("news_sources_created_total").increment(1);
        tracing::debug!(hostname, "news source created");
        Ok(true)
    }
}
