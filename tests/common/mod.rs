// tests/common/mod.rs
//
// Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use news_enricher::analysis::{AnalysisError, EnrichmentKind, StubAnalyzer, TextAnalyzer};
use news_enricher::bus::{Message, MessageBus, PublishError};
use news_enricher::config::ChannelConfig;
use news_enricher::ingest::{FanOutPublisher, IngestionCoordinator, SourceRegistry};
use news_enricher::report::TracingReporter;
use news_enricher::store::{
    FieldAssignment, MemoryStore, Record, RecordStore, StoreError, StoreResult, Table,
};

/// Memory store that counts mutating calls.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecordStore for CountingStore {
    async fn get(&self, table: Table, key: &str) -> StoreResult<Option<Record>> {
        self.inner.get(table, key).await
    }

    async fn put(&self, table: Table, record: Record) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(table, record).await
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignment: FieldAssignment,
    ) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(table, key, assignment).await
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(table, key).await
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        self.inner.scan(table).await
    }
}

/// Every call fails with a backend error.
pub struct FailingStore;

#[async_trait::async_trait]
impl RecordStore for FailingStore {
    async fn get(&self, _table: Table, _key: &str) -> StoreResult<Option<Record>> {
        Err(StoreError::Backend("store down".into()))
    }

    async fn put(&self, _table: Table, _record: Record) -> StoreResult<()> {
        Err(StoreError::Backend("store down".into()))
    }

    async fn update(
        &self,
        _table: Table,
        _key: &str,
        _assignment: FieldAssignment,
    ) -> StoreResult<()> {
        Err(StoreError::Backend("store down".into()))
    }

    async fn delete(&self, _table: Table, _key: &str) -> StoreResult<()> {
        Err(StoreError::Backend("store down".into()))
    }

    async fn scan(&self, _table: Table) -> StoreResult<Vec<Record>> {
        Err(StoreError::Backend("store down".into()))
    }
}

/// Records publishes; the publish numbered `fail_on` (1-based) is rejected.
#[derive(Default)]
pub struct RecordingBus {
    pub published: Mutex<Vec<(String, Message)>>,
    pub fail_on: Option<usize>,
    attempts: AtomicUsize,
}

impl RecordingBus {
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub fn channels(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MessageBus for RecordingBus {
    async fn publish(&self, channel: &str, message: Message) -> Result<(), PublishError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(n) {
            return Err(PublishError::Rejected {
                channel: channel.to_string(),
                reason: "injected failure".into(),
            });
        }
        self.published
            .lock()
            .unwrap()
            .push((channel.to_string(), message));
        Ok(())
    }
}

/// Analyzer answering every kind with the same body.
pub struct StaticAnalyzer(pub Value);

#[async_trait::async_trait]
impl TextAnalyzer for StaticAnalyzer {
    async fn analyze(&self, _kind: EnrichmentKind, _url: &str) -> Result<Value, AnalysisError> {
        Ok(self.0.clone())
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

pub fn coordinator(
    store: Arc<dyn RecordStore>,
    bus: Arc<dyn MessageBus>,
) -> IngestionCoordinator {
    IngestionCoordinator::new(
        store.clone(),
        SourceRegistry::new(store),
        FanOutPublisher::new(bus, ChannelConfig::default()),
        Arc::new(TracingReporter),
    )
}

pub fn stub() -> Arc<dyn TextAnalyzer> {
    Arc::new(StubAnalyzer::new())
}
