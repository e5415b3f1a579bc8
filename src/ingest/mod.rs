// src/ingest/mod.rs
//! Article ingestion: validate → dedup article → dedup source → fan-out.
//!
//! Steps run strictly in sequence and the first failure ends the flow.
//! Completed writes are not compensated: an article may exist without its
//! source, or without all four enrichment requests having gone out.

pub mod fanout;
pub mod registry;

use std::sync::Arc;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::PipelineResult;
use crate::model::{Article, ArticleUrl, StoredEntity};
use crate::report::{report_outcome, Reporter};
use crate::store::{RecordStore, Table};

pub use fanout::{EnrichmentRequest, FanOutPublisher};
pub use registry::SourceRegistry;

pub const OPERATION: &str = "article_create";

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("articles_created_total", "Articles written on first ingestion.");
        describe_counter!(
            "articles_deduplicated_total",
            "Submissions whose article already existed."
        );
        describe_counter!(
            "news_sources_created_total",
            "News sources written on first sighting of a hostname."
        );
        describe_counter!(
            "enrichment_requests_published_total",
            "Enrichment requests published, by kind."
        );
        describe_counter!(
            "enrichment_updates_total",
            "Article fields written by enrichment workers, by kind."
        );
        describe_counter!(
            "pipeline_errors_total",
            "Failed operations, by operation and error kind."
        );
    });
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingested {
    pub url: String,
    pub article_created: bool,
    pub source_created: bool,
}

pub struct IngestionCoordinator {
    store: Arc<dyn RecordStore>,
    sources: SourceRegistry,
    fanout: FanOutPublisher,
    reporter: Arc<dyn Reporter>,
}

impl IngestionCoordinator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sources: SourceRegistry,
        fanout: FanOutPublisher,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        ensure_metrics_described();
        Self {
            store,
            sources,
            fanout,
            reporter,
        }
    }

    /// Ingest `url`. Re-submitting a known url writes nothing but fans out again.
    pub async fn submit_article(&self, url: Option<&str>) -> PipelineResult<Ingested> {
        let result = self.run(url).await;
        report_outcome(self.reporter.as_ref(), OPERATION, url, result)
    }

    async fn run(&self, url: Option<&str>) -> PipelineResult<Ingested> {
        let url = ArticleUrl::parse(url)?;

        let article_created = self.ensure_article(&url).await?;
        let source_created = self.sources.ensure_source(url.host()).await?;
        self.fanout.publish_enrichment_requests(&url).await?;

        tracing::info!(
            target: "ingest",
            url = %url,
            article_created,
            source_created,
            "article submitted"
        );
        Ok(Ingested {
            url: url.as_str().to_string(),
            article_created,
            source_created,
        })
    }

    async fn ensure_article(&self, url: &ArticleUrl) -> PipelineResult<bool> {
        if self.store.get(Table::Article, url.as_str()).await?.is_some() {
            counter!("articles_deduplicated_total").increment(1);
            return Ok(false);
        }
        let article = Article::new(url.as_str(), url.host());
        self.store.put(Table::Article, article.to_record()?).await?;
        counter!("articles_created_total").increment(1);
        Ok(true)
    }
}
