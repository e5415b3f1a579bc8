// src/pipeline.rs
//! Wires store, bus, analyzer and reporter into the pipeline components.
//!
//! Every adapter handed to a component is wrapped in `WithTimeout`, so no
//! store, bus or analysis call can hang a request or a worker indefinitely.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::info;

use crate::analysis::{HodClient, StubAnalyzer, TextAnalyzer};
use crate::bus::{LocalBus, MessageBus};
use crate::config::AppConfig;
use crate::ingest::{FanOutPublisher, IngestionCoordinator, SourceRegistry};
use crate::query::ArticleQueries;
use crate::report::{Reporter, ReporterMux, TracingReporter, WebhookReporter};
use crate::store::{FileStore, MemoryStore, RecordStore};
use crate::timeout::WithTimeout;
use crate::workers::WorkerSet;

#[derive(Clone)]
pub struct Pipeline {
    pub ingest: Arc<IngestionCoordinator>,
    pub queries: Arc<ArticleQueries>,
    pub workers: WorkerSet,
    reporter: Arc<dyn Reporter>,
    bus: LocalBus,
    config: Arc<AppConfig>,
}

impl Pipeline {
    /// Assemble a pipeline on the in-process bus from explicit adapters.
    pub fn assemble(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        analyzer: Arc<dyn TextAnalyzer>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let t = config.timeouts;
        let bus = LocalBus::with_capacity(config.bus_capacity);

        let store: Arc<dyn RecordStore> = Arc::new(WithTimeout::new(store, t.store()));
        let publisher: Arc<dyn MessageBus> = Arc::new(WithTimeout::new(
            Arc::new(bus.clone()) as Arc<dyn MessageBus>,
            t.bus(),
        ));
        let analyzer: Arc<dyn TextAnalyzer> =
            Arc::new(WithTimeout::new(analyzer, t.analysis()));

        let ingest = IngestionCoordinator::new(
            store.clone(),
            SourceRegistry::new(store.clone()),
            FanOutPublisher::new(publisher, config.channels.clone()),
            reporter.clone(),
        );
        let queries = ArticleQueries::new(store.clone(), reporter.clone());
        let workers = WorkerSet::new(store, analyzer, reporter.clone());

        Self {
            ingest: Arc::new(ingest),
            queries: Arc::new(queries),
            workers,
            reporter,
            bus,
            config: Arc::new(config),
        }
    }

    /// Build every adapter from configuration.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.store.dir {
            Some(dir) => Arc::new(FileStore::open(dir)?),
            None => Arc::new(MemoryStore::new()),
        };

        let analyzer: Arc<dyn TextAnalyzer> = match config.analysis.provider.as_str() {
            "stub" => Arc::new(StubAnalyzer::new()),
            _ => Arc::new(HodClient::new(
                config.analysis.base_url.clone(),
                config.analysis.api_key.clone(),
                config.timeouts.analysis(),
            )?),
        };

        let mut reporter = ReporterMux::new().with(Arc::new(TracingReporter));
        if let Some(url) = &config.report.webhook_url {
            reporter = reporter.with(Arc::new(
                WebhookReporter::new(url.clone(), config.environment.clone())
                    .with_min_level(config.report.min_level()),
            ));
        }

        info!(
            store = if config.store.dir.is_some() { "file" } else { "memory" },
            analysis = analyzer.provider_name(),
            report_sinks = reporter.len(),
            "pipeline configured"
        );
        Ok(Self::assemble(config, store, analyzer, Arc::new(reporter)))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reporter shared by every component.
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    pub fn bus(&self) -> &LocalBus {
        &self.bus
    }

    /// Subscribe the four workers to their channels and run them in the background.
    pub fn spawn_workers(&self) -> Vec<JoinHandle<()>> {
        self.workers.spawn_on(&self.bus, &self.config.channels)
    }

    /// Close the bus; spawned workers drain and stop.
    pub fn shutdown(&self) {
        self.bus.close();
    }
}
