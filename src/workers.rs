// src/workers.rs
//! Enrichment workers: one per capability, each owning exactly one article field.
//!
//! Workers of different kinds write disjoint fields, so they run concurrently
//! without coordination. A message is consumed whatever the outcome; there is
//! no requeue here, redelivery is the bus's business.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::counter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::analysis::{Enrichment, EnrichmentKind, TextAnalyzer};
use crate::bus::{LocalBus, Message};
use crate::config::ChannelConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::EnrichmentRequest;
use crate::report::{report_outcome, Reporter};
use crate::store::{RecordStore, StoreError, Table};

#[derive(Clone)]
pub struct EnrichmentWorker {
    kind: EnrichmentKind,
    store: Arc<dyn RecordStore>,
    analyzer: Arc<dyn TextAnalyzer>,
    reporter: Arc<dyn Reporter>,
}

impl EnrichmentWorker {
    pub fn new(
        kind: EnrichmentKind,
        store: Arc<dyn RecordStore>,
        analyzer: Arc<dyn TextAnalyzer>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            kind,
            store,
            analyzer,
            reporter,
        }
    }

    pub fn kind(&self) -> EnrichmentKind {
        self.kind
    }

    /// Handle one delivered message and report the outcome.
    pub async fn handle(&self, message: &Message) -> PipelineResult<Enrichment> {
        let url = message.attribute(crate::ingest::fanout::URL_ATTRIBUTE);
        let result = self.process(message).await;
        report_outcome(self.reporter.as_ref(), self.kind.operation(), url, result)
    }

    async fn process(&self, message: &Message) -> PipelineResult<Enrichment> {
        let request = EnrichmentRequest::from_message(message)?;
        let url = request.url.as_str();

        let body = self.analyzer.analyze(self.kind, url).await?;
        let enrichment = Enrichment::from_response(self.kind, &body)?;

        let assignment = enrichment.to_assignment().map_err(StoreError::from)?;
        self.store.update(Table::Article, url, assignment).await?;

        counter!("enrichment_updates_total", "kind" => self.kind.as_str()).increment(1);
        tracing::debug!(kind = %self.kind, url, "article field updated");
        Ok(enrichment)
    }

    /// Consume `rx` until the bus closes. Handler errors and lag never stop the loop.
    pub async fn run(self, mut rx: broadcast::Receiver<Message>) {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    // Outcome already reported by `handle`.
                    let _ = self.handle(&message).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(kind = %self.kind, missed, "worker lagged; messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(kind = %self.kind, "bus closed; worker stopping");
                    break;
                }
            }
        }
    }
}

/// The four workers, addressable by kind.
#[derive(Clone)]
pub struct WorkerSet {
    workers: BTreeMap<EnrichmentKind, EnrichmentWorker>,
}

impl WorkerSet {
    pub fn new(
        store: Arc<dyn RecordStore>,
        analyzer: Arc<dyn TextAnalyzer>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let workers = EnrichmentKind::ALL
            .into_iter()
            .map(|kind| {
                let w = EnrichmentWorker::new(
                    kind,
                    store.clone(),
                    analyzer.clone(),
                    reporter.clone(),
                );
                (kind, w)
            })
            .collect();
        Self { workers }
    }

    pub fn get(&self, kind: EnrichmentKind) -> &EnrichmentWorker {
        // Every kind is inserted by `new`.
        &self.workers[&kind]
    }

    /// Push-style delivery (e.g. from an HTTP subscription endpoint).
    pub async fn dispatch(
        &self,
        kind: EnrichmentKind,
        message: &Message,
    ) -> Result<Enrichment, PipelineError> {
        self.get(kind).handle(message).await
    }

    /// Subscribe every worker to its channel on `bus` and run them in the background.
    pub fn spawn_on(&self, bus: &LocalBus, channels: &ChannelConfig) -> Vec<JoinHandle<()>> {
        self.workers
            .values()
            .map(|w| {
                let rx = bus.subscribe(channels.channel(w.kind()));
                tokio::spawn(w.clone().run(rx))
            })
            .collect()
    }
}
