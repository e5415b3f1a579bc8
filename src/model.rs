// src/model.rs
//! Stored entities and url validation shared by every entry point.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::PipelineError;
use crate::store::{Record, StoreError};

/// Per-url record holding the enrichment fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub url: String,
    /// Absent only when a worker wrote to a url before its ingestion finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentAggregate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<TextStatistics>,
}

impl Article {
    /// Fresh article with no enrichment yet.
    pub fn new(url: impl Into<String>, news_source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            news_source: Some(news_source.into()),
            concepts: None,
            lang: None,
            sentiment: None,
            statistics: None,
        }
    }
}

/// Per-hostname record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub url: String,
}

/// Document-level sentiment as returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAggregate {
    pub sentiment: String,
    /// Absent when the service sent no score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Text metrics. `sentences` is always present; other metrics are kept as delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStatistics {
    pub sentences: u64,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, Value>,
}

/// Conversion between typed entities and raw store records.
pub trait StoredEntity: Sized + Serialize + serde::de::DeserializeOwned {
    fn to_record(&self) -> Result<Record, StoreError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::Backend("entity did not serialize to an object".into())),
        }
    }

    fn from_record(record: Record) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

impl StoredEntity for Article {}
impl StoredEntity for NewsSource {}

/// A validated article url: the trimmed input (used verbatim as the key) and its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUrl {
    raw: String,
    host: String,
}

impl ArticleUrl {
    /// Reject absent, blank, relative, and host-less urls.
    pub fn parse(input: Option<&str>) -> Result<Self, PipelineError> {
        let raw = input
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::Validation("missing url".into()))?;
        let parsed = Url::parse(raw)
            .map_err(|e| PipelineError::Validation(format!("invalid url {raw:?}: {e}")))?;
        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PipelineError::Validation(format!("url {raw:?} has no host")))?;
        Ok(Self {
            raw: raw.to_string(),
            host: host.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Display for ArticleUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_keeps_input_and_lowercases_host() {
        let u = ArticleUrl::parse(Some("  http://Example.COM/a?b=1 ")).unwrap();
        assert_eq!(u.as_str(), "http://Example.COM/a?b=1");
        assert_eq!(u.host(), "example.com");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in [None, Some(""), Some("   "), Some("not a url"), Some("/relative/path"), Some("mailto:a@b.com")] {
            assert!(
                matches!(ArticleUrl::parse(bad), Err(PipelineError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn article_record_uses_camel_case_and_omits_unset_fields() {
        let a = Article::new("http://example.com/a", "example.com");
        let rec = a.to_record().unwrap();
        assert_eq!(
            Value::Object(rec.clone()),
            json!({ "url": "http://example.com/a", "newsSource": "example.com" })
        );
        assert_eq!(Article::from_record(rec).unwrap(), a);
    }

    #[test]
    fn statistics_keep_extra_metrics() {
        let s: TextStatistics =
            serde_json::from_value(json!({ "sentences": 3, "words": 40, "characters": 210 }))
                .unwrap();
        assert_eq!(s.sentences, 3);
        assert_eq!(s.metrics["words"], json!(40));
        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back, json!({ "sentences": 3, "words": 40, "characters": 210 }));
    }
}
