// tests/metrics.rs
//
// /metrics exposes the pipeline counters once the recorder is installed.
// Single test: the recorder is process-global.

mod common;

use std::sync::Arc;

use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt as _;

use news_enricher::metrics::Metrics;

use common::{coordinator, FailingStore, RecordingBus};

#[tokio::test]
async fn counters_show_up_on_metrics_endpoint() {
    let metrics = Metrics::init().expect("install recorder");

    let store = Arc::new(common::CountingStore::default());
    let c = coordinator(store, Arc::new(RecordingBus::default()));
    c.submit_article(Some("http://example.com/a")).await.unwrap();
    c.submit_article(Some("http://example.com/a")).await.unwrap();

    let failing = coordinator(Arc::new(FailingStore), Arc::new(RecordingBus::default()));
    let _ = failing.submit_article(Some("http://example.com/b")).await;

    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = metrics.router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("articles_created_total 1"), "{text}");
    assert!(text.contains("articles_deduplicated_total 1"), "{text}");
    assert!(text.contains("news_sources_created_total 1"), "{text}");
    assert!(text.contains("enrichment_requests_published_total"), "{text}");
    assert!(text.contains("pipeline_errors_total"), "{text}");
}
