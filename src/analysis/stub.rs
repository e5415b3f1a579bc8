// src/analysis/stub.rs
use std::collections::HashMap;

use serde_json::{json, Value};

use super::{AnalysisError, EnrichmentKind, TextAnalyzer};

/// Deterministic analyzer for local runs and tests: one canned response per kind.
#[derive(Debug, Clone)]
pub struct StubAnalyzer {
    responses: HashMap<EnrichmentKind, Value>,
}

impl Default for StubAnalyzer {
    fn default() -> Self {
        let mut responses = HashMap::new();
        responses.insert(
            EnrichmentKind::Concepts,
            json!({ "concepts": [{ "concept": "news", "occurrences": 1 }] }),
        );
        responses.insert(
            EnrichmentKind::Language,
            json!({ "language": "english", "iso639-3code": "eng" }),
        );
        responses.insert(
            EnrichmentKind::Sentiment,
            json!({ "aggregate": { "sentiment": "neutral", "score": 0.0 } }),
        );
        responses.insert(
            EnrichmentKind::Statistics,
            json!({ "sentences": 1, "words": 1, "characters": 1 }),
        );
        Self { responses }
    }
}

impl StubAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canned response for `kind`.
    pub fn with_response(mut self, kind: EnrichmentKind, body: Value) -> Self {
        self.responses.insert(kind, body);
        self
    }
}

#[async_trait::async_trait]
impl TextAnalyzer for StubAnalyzer {
    async fn analyze(&self, kind: EnrichmentKind, _url: &str) -> Result<Value, AnalysisError> {
        Ok(self.responses.get(&kind).cloned().unwrap_or(Value::Null))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}
