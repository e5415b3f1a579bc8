// src/timeout.rs
//! Deadline wrapper for adapters.
//!
//! `WithTimeout<dyn Trait>` implements the wrapped trait and turns an elapsed
//! deadline into that adapter's own `Timeout` error variant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::analysis::{AnalysisError, EnrichmentKind, TextAnalyzer};
use crate::bus::{Message, MessageBus, PublishError};
use crate::store::{FieldAssignment, Page, Record, RecordStore, StoreError, StoreResult, Table};

pub struct WithTimeout<T: ?Sized> {
    inner: Arc<T>,
    limit: Duration,
}

impl<T: ?Sized> WithTimeout<T> {
    pub fn new(inner: Arc<T>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

async fn bounded<F, T, E>(limit: Duration, fut: F, elapsed: fn(Duration) -> E) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(elapsed(limit)),
    }
}

#[async_trait::async_trait]
impl RecordStore for WithTimeout<dyn RecordStore> {
    async fn get(&self, table: Table, key: &str) -> StoreResult<Option<Record>> {
        bounded(self.limit, self.inner.get(table, key), StoreError::Timeout).await
    }

    async fn put(&self, table: Table, record: Record) -> StoreResult<()> {
        bounded(self.limit, self.inner.put(table, record), StoreError::Timeout).await
    }

    async fn update(
        &self,
        table: Table,
        key: &str,
        assignment: FieldAssignment,
    ) -> StoreResult<()> {
        bounded(
            self.limit,
            self.inner.update(table, key, assignment),
            StoreError::Timeout,
        )
        .await
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        bounded(self.limit, self.inner.delete(table, key), StoreError::Timeout).await
    }

    async fn scan(&self, table: Table) -> StoreResult<Vec<Record>> {
        bounded(self.limit, self.inner.scan(table), StoreError::Timeout).await
    }

    async fn scan_page(
        &self,
        table: Table,
        limit: usize,
        start_after: Option<&str>,
    ) -> StoreResult<Page<Record>> {
        bounded(
            self.limit,
            self.inner.scan_page(table, limit, start_after),
            StoreError::Timeout,
        )
        .await
    }
}

#[async_trait::async_trait]
impl MessageBus for WithTimeout<dyn MessageBus> {
    async fn publish(&self, channel: &str, message: Message) -> Result<(), PublishError> {
        bounded(
            self.limit,
            self.inner.publish(channel, message),
            PublishError::Timeout,
        )
        .await
    }
}

#[async_trait::async_trait]
impl TextAnalyzer for WithTimeout<dyn TextAnalyzer> {
    async fn analyze(&self, kind: EnrichmentKind, url: &str) -> Result<Value, AnalysisError> {
        bounded(self.limit, self.inner.analyze(kind, url), AnalysisError::Timeout).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
