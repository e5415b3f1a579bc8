// src/analysis/mod.rs
//! Text-analysis adapter: capability calls plus one-shot response validation.
//!
//! Analyzers return the service's raw JSON. `Enrichment::from_response` is the
//! only place that JSON is inspected; everything downstream works on the typed
//! variant.

pub mod hod;
pub mod stub;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::{SentimentAggregate, TextStatistics};
use crate::store::FieldAssignment;

pub use hod::HodClient;
pub use stub::StubAnalyzer;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{capability}: request failed: {source}")]
    Http {
        capability: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{capability}: service answered HTTP {status}")]
    Status { capability: &'static str, status: u16 },

    #[error("{capability}: response has no usable `{field}`")]
    MissingField {
        capability: &'static str,
        field: &'static str,
    },

    #[error("{capability}: malformed response: {reason}")]
    Malformed {
        capability: &'static str,
        reason: String,
    },

    #[error("analysis call exceeded {0:?}")]
    Timeout(Duration),
}

/// The four enrichment capabilities, in fan-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnrichmentKind {
    Concepts,
    Language,
    Sentiment,
    Statistics,
}

impl EnrichmentKind {
    pub const ALL: [EnrichmentKind; 4] = [
        EnrichmentKind::Concepts,
        EnrichmentKind::Language,
        EnrichmentKind::Sentiment,
        EnrichmentKind::Statistics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concepts => "concepts",
            Self::Language => "language",
            Self::Sentiment => "sentiment",
            Self::Statistics => "statistics",
        }
    }

    /// Name of the capability on the analysis service.
    pub fn capability(self) -> &'static str {
        match self {
            Self::Concepts => "extractconcepts",
            Self::Language => "identifylanguage",
            Self::Sentiment => "analyzesentiment",
            Self::Statistics => "gettextstatistics",
        }
    }

    /// Article field this kind writes.
    pub fn field(self) -> &'static str {
        match self {
            Self::Concepts => "concepts",
            Self::Language => "lang",
            Self::Sentiment => "sentiment",
            Self::Statistics => "statistics",
        }
    }

    /// Operation name used when reporting worker outcomes.
    pub fn operation(self) -> &'static str {
        match self {
            Self::Concepts => "enrich_concepts",
            Self::Language => "enrich_language",
            Self::Sentiment => "enrich_sentiment",
            Self::Statistics => "enrich_statistics",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrichmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concepts" => Ok(Self::Concepts),
            "language" | "lang" => Ok(Self::Language),
            "sentiment" => Ok(Self::Sentiment),
            "statistics" | "stats" => Ok(Self::Statistics),
            other => Err(format!("unknown enrichment kind `{other}`")),
        }
    }
}

/// A validated analysis result, one variant per capability.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Concepts(Vec<String>),
    Language(String),
    Sentiment(SentimentAggregate),
    Statistics(TextStatistics),
}

impl Enrichment {
    pub fn kind(&self) -> EnrichmentKind {
        match self {
            Self::Concepts(_) => EnrichmentKind::Concepts,
            Self::Language(_) => EnrichmentKind::Language,
            Self::Sentiment(_) => EnrichmentKind::Sentiment,
            Self::Statistics(_) => EnrichmentKind::Statistics,
        }
    }

    /// Validate a raw service response for `kind`.
    pub fn from_response(kind: EnrichmentKind, body: &Value) -> Result<Self, AnalysisError> {
        let capability = kind.capability();
        let missing = |field| AnalysisError::MissingField { capability, field };
        let malformed = |e: serde_json::Error| AnalysisError::Malformed {
            capability,
            reason: e.to_string(),
        };

        match kind {
            EnrichmentKind::Concepts => {
                let raw = body.get("concepts").ok_or_else(|| missing("concepts"))?;
                let entries: Vec<ConceptEntry> =
                    serde_json::from_value(raw.clone()).map_err(malformed)?;
                let concepts: Vec<String> = entries
                    .into_iter()
                    .map(ConceptEntry::into_text)
                    .filter(|c| !c.trim().is_empty())
                    .collect();
                if concepts.is_empty() {
                    return Err(missing("concepts"));
                }
                Ok(Self::Concepts(concepts))
            }
            EnrichmentKind::Language => body
                .get("language")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| Self::Language(l.to_string()))
                .ok_or_else(|| missing("language")),
            EnrichmentKind::Sentiment => {
                let aggregate = body
                    .get("aggregate")
                    .filter(|a| {
                        a.get("sentiment")
                            .and_then(Value::as_str)
                            .map(str::trim)
                            .is_some_and(|s| !s.is_empty())
                    })
                    .ok_or_else(|| missing("aggregate.sentiment"))?;
                Ok(Self::Sentiment(
                    serde_json::from_value(aggregate.clone()).map_err(malformed)?,
                ))
            }
            EnrichmentKind::Statistics => {
                if body.get("sentences").map_or(true, Value::is_null) {
                    return Err(missing("sentences"));
                }
                Ok(Self::Statistics(
                    serde_json::from_value(body.clone()).map_err(malformed)?,
                ))
            }
        }
    }

    /// The single-field patch this enrichment applies to its article.
    pub fn to_assignment(&self) -> Result<FieldAssignment, serde_json::Error> {
        let value = match self {
            Self::Concepts(c) => serde_json::to_value(c)?,
            Self::Language(l) => Value::String(l.clone()),
            Self::Sentiment(s) => serde_json::to_value(s)?,
            Self::Statistics(s) => serde_json::to_value(s)?,
        };
        Ok(FieldAssignment::new(self.kind().field(), value))
    }
}

/// Concepts arrive either as bare strings or as `{ "concept": "...", ... }` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConceptEntry {
    Text(String),
    Scored { concept: String },
}

impl ConceptEntry {
    fn into_text(self) -> String {
        match self {
            Self::Text(t) | Self::Scored { concept: t } => t,
        }
    }
}

/// Calls one analysis capability for the text behind `url`.
#[async_trait::async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(&self, kind: EnrichmentKind, url: &str) -> Result<Value, AnalysisError>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn concepts_accept_strings_and_scored_objects() {
        let plain = Enrichment::from_response(
            EnrichmentKind::Concepts,
            &json!({ "concepts": ["x", "y"] }),
        )
        .unwrap();
        assert_eq!(plain, Enrichment::Concepts(vec!["x".into(), "y".into()]));

        let scored = Enrichment::from_response(
            EnrichmentKind::Concepts,
            &json!({ "concepts": [{ "concept": "Chicago", "occurrences": 4 }] }),
        )
        .unwrap();
        assert_eq!(scored, Enrichment::Concepts(vec!["Chicago".into()]));
    }

    #[test]
    fn empty_concepts_are_an_error() {
        let err = Enrichment::from_response(EnrichmentKind::Concepts, &json!({ "concepts": [] }))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingField { field: "concepts", .. }));
    }

    #[test]
    fn sentiment_requires_aggregate_sentiment() {
        let err = Enrichment::from_response(
            EnrichmentKind::Sentiment,
            &json!({ "aggregate": { "score": 0.4 } }),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::MissingField { field: "aggregate.sentiment", .. }
        ));

        for blank in [json!(""), json!("   "), json!(null)] {
            let err = Enrichment::from_response(
                EnrichmentKind::Sentiment,
                &json!({ "aggregate": { "sentiment": blank, "score": 0.1 } }),
            )
            .unwrap_err();
            assert!(matches!(
                err,
                AnalysisError::MissingField { field: "aggregate.sentiment", .. }
            ));
        }

        let ok = Enrichment::from_response(
            EnrichmentKind::Sentiment,
            &json!({ "positive": [], "aggregate": { "sentiment": "positive", "score": 0.61 } }),
        )
        .unwrap();
        let Enrichment::Sentiment(agg) = ok else {
            panic!("expected sentiment variant");
        };
        assert_eq!(agg.sentiment, "positive");
        assert!((agg.score.unwrap() - 0.61).abs() < 1e-9);

        let unscored = Enrichment::from_response(
            EnrichmentKind::Sentiment,
            &json!({ "aggregate": { "sentiment": "neutral" } }),
        )
        .unwrap();
        let value = unscored.to_assignment().unwrap().value;
        assert_eq!(value, json!({ "sentiment": "neutral" }));
    }

    #[test]
    fn language_and_statistics_map_to_their_fields() {
        let lang =
            Enrichment::from_response(EnrichmentKind::Language, &json!({ "language": "english" }))
                .unwrap();
        let a = lang.to_assignment().unwrap();
        assert_eq!(a.field, "lang");
        assert_eq!(a.value, json!("english"));

        let stats = Enrichment::from_response(
            EnrichmentKind::Statistics,
            &json!({ "sentences": 12, "words": 230 }),
        )
        .unwrap();
        let a = stats.to_assignment().unwrap();
        assert_eq!(a.field, "statistics");
        assert_eq!(a.value, json!({ "sentences": 12, "words": 230 }));

        assert!(Enrichment::from_response(EnrichmentKind::Statistics, &json!({ "words": 1 })).is_err());
        assert!(Enrichment::from_response(EnrichmentKind::Language, &json!({ "language": "" })).is_err());
    }

    #[test]
    fn kind_parses_from_route_segments() {
        assert_eq!("stats".parse::<EnrichmentKind>().unwrap(), EnrichmentKind::Statistics);
        assert_eq!("Language".parse::<EnrichmentKind>().unwrap(), EnrichmentKind::Language);
        assert!("images".parse::<EnrichmentKind>().is_err());
    }
}
