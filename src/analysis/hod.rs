//! HTTP client for a Haven OnDemand-style text analysis API.
//!
//! Each capability is a synchronous endpoint at
//! `{base_url}/1/api/sync/{capability}/v1` taking the document `url` and the
//! `apikey` as form fields and answering with a JSON object.

use std::time::Duration;

use serde_json::Value;

use super::{AnalysisError, EnrichmentKind, TextAnalyzer};

pub const DEFAULT_BASE_URL: &str = "https://api.havenondemand.com";

pub struct HodClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HodClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("news-enricher/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4).min(timeout))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, kind: EnrichmentKind) -> String {
        format!("{}/1/api/sync/{}/v1", self.base_url, kind.capability())
    }
}

#[async_trait::async_trait]
impl TextAnalyzer for HodClient {
    async fn analyze(&self, kind: EnrichmentKind, url: &str) -> Result<Value, AnalysisError> {
        let capability = kind.capability();
        let resp = self
            .http
            .post(self.endpoint(kind))
            .form(&[("url", url), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| AnalysisError::Http { capability, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnalysisError::Status {
                capability,
                status: status.as_u16(),
            });
        }

        resp.json::<Value>()
            .await
            .map_err(|source| AnalysisError::Http { capability, source })
    }

    fn provider_name(&self) -> &'static str {
        "havenondemand"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_capability_and_trims_slash() {
        let c = HodClient::new("http://localhost:9000/", "k", Duration::from_secs(1)).unwrap();
        assert_eq!(
            c.endpoint(EnrichmentKind::Sentiment),
            "http://localhost:9000/1/api/sync/analyzesentiment/v1"
        );
    }
}
