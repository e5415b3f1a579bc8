use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::Level;

use super::Reporter;

/// Posts each report as JSON to an alerting webhook (Rollbar-style item
/// payload). Sends happen on a spawned task; failures are logged and dropped.
#[derive(Clone)]
pub struct WebhookReporter {
    url: String,
    environment: String,
    min_level: Level,
    client: Client,
    timeout: Duration,
}

impl WebhookReporter {
    pub fn new(url: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            environment: environment.into(),
            min_level: Level::INFO,
            client: Client::new(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Drop reports less severe than `level`.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    fn payload(&self, level: Level, message: &str, context: Value) -> Value {
        json!({
            "data": {
                "environment": self.environment,
                "level": level.as_str().to_ascii_lowercase(),
                "timestamp": chrono::Utc::now().timestamp(),
                "body": { "message": { "body": message } },
                "custom": context,
            }
        })
    }
}

impl Reporter for WebhookReporter {
    fn report(&self, level: Level, message: &str, context: Value) {
        // tracing::Level orders ERROR < WARN < INFO < DEBUG < TRACE
        if level > self.min_level {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("webhook report skipped: no tokio runtime");
            return;
        };

        let body = self.payload(level, message, context);
        let client = self.client.clone();
        let url = self.url.clone();
        let timeout = self.timeout;
        handle.spawn(async move {
            let res = client
                .post(&url)
                .timeout(timeout)
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());
            if let Err(e) = res {
                tracing::warn!(error = %e, "report webhook failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_level_message_and_context() {
        let r = WebhookReporter::new("http://localhost/hook", "test");
        let p = r.payload(
            Level::ERROR,
            "Request handled by article_create",
            json!({ "kind": "store" }),
        );
        assert_eq!(p["data"]["level"], "error");
        assert_eq!(p["data"]["environment"], "test");
        assert_eq!(
            p["data"]["body"]["message"]["body"],
            "Request handled by article_create"
        );
        assert_eq!(p["data"]["custom"]["kind"], "store");
    }

    #[test]
    fn report_outside_runtime_is_a_no_op() {
        let r = WebhookReporter::new("http://127.0.0.1:9/hook", "test");
        r.report(Level::ERROR, "x", json!({}));
    }
}
