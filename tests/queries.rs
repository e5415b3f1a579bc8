// tests/queries.rs
//
// Read/delete surface on top of a file-backed store:
// - paging walks every source exactly once in key order
// - records survive reopening the store directory
// - delete removes the article only

mod common;

use std::sync::Arc;

use news_enricher::query::ArticleQueries;
use news_enricher::report::TracingReporter;
use news_enricher::store::FileStore;
use news_enricher::PipelineError;

use common::{coordinator, RecordingBus};

#[tokio::test]
async fn paging_walks_all_sources_in_key_order() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(tmp.path()).unwrap());
    let c = coordinator(store.clone(), Arc::new(RecordingBus::default()));

    for host in ["d.com", "a.com", "c.com", "e.com", "b.com"] {
        let url = format!("http://{host}/x");
        c.submit_article(Some(url.as_str())).await.unwrap();
    }

    let q = ArticleQueries::new(store, Arc::new(TracingReporter));
    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = q
            .list_news_sources_page(2, cursor.as_deref())
            .await
            .unwrap();
        assert!(page.items.len() <= 2);
        seen.extend(page.items.into_iter().map(|s| s.url));
        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen, vec!["a.com", "b.com", "c.com", "d.com", "e.com"]);
}

#[tokio::test]
async fn records_survive_reopen_and_delete_keeps_source() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let store = Arc::new(FileStore::open(tmp.path()).unwrap());
        coordinator(store, Arc::new(RecordingBus::default()))
            .submit_article(Some("http://example.com/a"))
            .await
            .unwrap();
    }

    let store = Arc::new(FileStore::open(tmp.path()).unwrap());
    let q = ArticleQueries::new(store, Arc::new(TracingReporter));

    let a = q.get_article(Some("http://example.com/a")).await.unwrap();
    assert_eq!(a.news_source.as_deref(), Some("example.com"));

    q.delete_article(Some("http://example.com/a")).await.unwrap();
    assert!(matches!(
        q.get_article(Some("http://example.com/a")).await,
        Err(PipelineError::NotFound(_))
    ));
    let sources = q.list_news_sources().await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].url, "example.com");
}
