//! Demo that pushes a few urls through an in-memory pipeline with the stub analyzer.

use std::sync::Arc;
use std::time::Duration;

use news_enricher::analysis::StubAnalyzer;
use news_enricher::report::TracingReporter;
use news_enricher::store::MemoryStore;
use news_enricher::{AppConfig, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let pipeline = Pipeline::assemble(
        AppConfig::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(StubAnalyzer::new()),
        Arc::new(TracingReporter),
    );
    let workers = pipeline.spawn_workers();

    let urls = [
        "http://example.com/a",
        "http://example.com/b",
        "https://news.example.org/story",
        "http://example.com/a",
    ];
    for url in urls {
        let out = pipeline.ingest.submit_article(Some(url)).await?;
        println!(
            "{url}: article_created={} source_created={}",
            out.article_created, out.source_created
        );
    }

    // Let the workers drain their channels.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let article = pipeline.queries.get_article(Some(urls[0])).await?;
    println!("{}", serde_json::to_string_pretty(&article)?);
    for source in pipeline.queries.list_news_sources().await? {
        println!("source: {}", source.url);
    }

    pipeline.shutdown();
    for w in workers {
        let _ = w.await;
    }
    println!("ingest-demo done");
    Ok(())
}
