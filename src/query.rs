// src/query.rs
//! Read/delete surface over articles and news sources.

use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::model::{Article, ArticleUrl, NewsSource, StoredEntity};
use crate::report::{report_outcome, Reporter};
use crate::store::{Page, RecordStore, Table};

pub const MAX_PAGE_SIZE: usize = 1000;

pub struct ArticleQueries {
    store: Arc<dyn RecordStore>,
    reporter: Arc<dyn Reporter>,
}

impl ArticleQueries {
    pub fn new(store: Arc<dyn RecordStore>, reporter: Arc<dyn Reporter>) -> Self {
        Self { store, reporter }
    }

    /// `NotFound` when no article is stored under `url`.
    pub async fn get_article(&self, url: Option<&str>) -> PipelineResult<Article> {
        let result = self.fetch_article(url).await;
        report_outcome(self.reporter.as_ref(), "article_get", url, result)
    }

    /// Hard delete. Unknown urls succeed; the news source is left alone.
    pub async fn delete_article(&self, url: Option<&str>) -> PipelineResult<()> {
        let result = self.remove_article(url).await;
        report_outcome(self.reporter.as_ref(), "article_delete", url, result)
    }

    /// Every news source. Unbounded; prefer `list_news_sources_page` for large tables.
    pub async fn list_news_sources(&self) -> PipelineResult<Vec<NewsSource>> {
        let result = self.scan_sources().await;
        report_outcome(self.reporter.as_ref(), "news_source_list", None, result)
    }

    /// Key-ordered page of news sources after `start_after`. `limit` is clamped to `1..=1000`.
    pub async fn list_news_sources_page(
        &self,
        limit: usize,
        start_after: Option<&str>,
    ) -> PipelineResult<Page<NewsSource>> {
        let result = self.scan_sources_page(limit, start_after).await;
        report_outcome(self.reporter.as_ref(), "news_source_list", start_after, result)
    }

    async fn fetch_article(&self, url: Option<&str>) -> PipelineResult<Article> {
        let url = ArticleUrl::parse(url)?;
        let record = self
            .store
            .get(Table::Article, url.as_str())
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("article {url}")))?;
        Ok(Article::from_record(record)?)
    }

    async fn remove_article(&self, url: Option<&str>) -> PipelineResult<()> {
        let url = ArticleUrl::parse(url)?;
        self.store.delete(Table::Article, url.as_str()).await?;
        Ok(())
    }

    async fn scan_sources(&self) -> PipelineResult<Vec<NewsSource>> {
        let records = self.store.scan(Table::NewsSource).await?;
        let sources = records
            .into_iter()
            .map(NewsSource::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sources)
    }

    async fn scan_sources_page(
        &self,
        limit: usize,
        start_after: Option<&str>,
    ) -> PipelineResult<Page<NewsSource>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let page = self
            .store
            .scan_page(Table::NewsSource, limit, start_after)
            .await?;
        let items = page
            .items
            .into_iter()
            .map(NewsSource::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            next: page.next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::testing::CaptureReporter;
    use crate::store::MemoryStore;

    fn queries(store: Arc<MemoryStore>) -> ArticleQueries {
        ArticleQueries::new(store, Arc::new(CaptureReporter::default()))
    }

    #[tokio::test]
    async fn get_distinguishes_found_and_not_found() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                Table::Article,
                Article::new("http://a.com/1", "a.com").to_record().unwrap(),
            )
            .await
            .unwrap();
        let q = queries(store);

        let a = q.get_article(Some("http://a.com/1")).await.unwrap();
        assert_eq!(a.news_source.as_deref(), Some("a.com"));
        assert!(matches!(
            q.get_article(Some("http://a.com/2")).await,
            Err(PipelineError::NotFound(_))
        ));
        assert!(matches!(
            q.get_article(None).await,
            Err(PipelineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_keeps_sources() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(
                Table::Article,
                Article::new("http://a.com/1", "a.com").to_record().unwrap(),
            )
            .await
            .unwrap();
        store
            .put(
                Table::NewsSource,
                NewsSource { url: "a.com".into() }.to_record().unwrap(),
            )
            .await
            .unwrap();
        let q = queries(store.clone());

        q.delete_article(Some("http://a.com/1")).await.unwrap();
        q.delete_article(Some("http://a.com/1")).await.unwrap();
        q.delete_article(Some("http://never.seen/")).await.unwrap();
        assert!(store.is_empty(Table::Article));
        assert_eq!(q.list_news_sources().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn page_limit_is_clamped() {
        let store = Arc::new(MemoryStore::new());
        for h in ["a.com", "b.com"] {
            store
                .put(Table::NewsSource, NewsSource { url: h.into() }.to_record().unwrap())
                .await
                .unwrap();
        }
        let page = queries(store).list_news_sources_page(0, None).await.unwrap();
        assert_eq!(page.items, vec![NewsSource { url: "a.com".into() }]);
        assert_eq!(page.next.as_deref(), Some("a.com"));
    }
}
