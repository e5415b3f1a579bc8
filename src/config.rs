// src/config.rs
//! Process configuration.
//!
//! Lookup order:
//! 1) `$NEWS_ENRICHER_CONFIG` (must exist when set)
//! 2) `config/news_enricher.toml`
//! 3) built-in defaults
//!
//! Env overrides are applied on top of whichever source was used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::hod::DEFAULT_BASE_URL;
use crate::analysis::EnrichmentKind;

pub const ENV_CONFIG_PATH: &str = "NEWS_ENRICHER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/news_enricher.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment label attached to webhook reports.
    pub environment: String,
    pub store: StoreConfig,
    pub analysis: AnalysisConfig,
    pub channels: ChannelConfig,
    pub timeouts: TimeoutConfig,
    pub report: ReportConfig,
    /// Per-topic buffer of the in-process bus.
    pub bus_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            store: StoreConfig::default(),
            analysis: AnalysisConfig::default(),
            channels: ChannelConfig::default(),
            timeouts: TimeoutConfig::default(),
            report: ReportConfig::default(),
            bus_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for the JSON file store; in-memory store when unset.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// "hod" | "stub" (case-insensitive)
    pub provider: String,
    pub base_url: String,
    /// "ENV" means: read from HOD_API_KEY
    pub api_key: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            provider: "hod".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: "ENV".into(),
        }
    }
}

/// Bus topic per enrichment kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub concepts: String,
    pub language: String,
    pub sentiment: String,
    pub statistics: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            concepts: "text-concepts".into(),
            language: "text-language".into(),
            sentiment: "text-sentiment".into(),
            statistics: "text-stats".into(),
        }
    }
}

impl ChannelConfig {
    pub fn channel(&self, kind: EnrichmentKind) -> &str {
        match kind {
            EnrichmentKind::Concepts => &self.concepts,
            EnrichmentKind::Language => &self.language,
            EnrichmentKind::Sentiment => &self.sentiment,
            EnrichmentKind::Statistics => &self.statistics,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub store_ms: u64,
    pub bus_ms: u64,
    pub analysis_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            store_ms: 2_000,
            bus_ms: 2_000,
            analysis_ms: 15_000,
        }
    }
}

impl TimeoutConfig {
    pub fn store(&self) -> Duration {
        Duration::from_millis(self.store_ms.max(1))
    }

    pub fn bus(&self) -> Duration {
        Duration::from_millis(self.bus_ms.max(1))
    }

    pub fn analysis(&self) -> Duration {
        Duration::from_millis(self.analysis_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub webhook_url: Option<String>,
    /// "error" | "warn" | "info"
    pub min_level: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            min_level: "info".into(),
        }
    }
}

impl ReportConfig {
    pub fn min_level(&self) -> tracing::Level {
        self.min_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl AppConfig {
    /// Load from an explicit TOML file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.finish()
    }

    /// Load using `$NEWS_ENRICHER_CONFIG` + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            return Self::load_from(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        AppConfig::default().finish()
    }

    fn finish(mut self) -> Result<Self> {
        self.apply_env_overrides();

        self.analysis.provider = self.analysis.provider.trim().to_lowercase();
        match self.analysis.provider.as_str() {
            "stub" => {}
            "hod" => {
                if self.analysis.api_key.trim().eq_ignore_ascii_case("env") {
                    self.analysis.api_key = std::env::var("HOD_API_KEY")
                        .map_err(|_| anyhow!("Missing HOD_API_KEY env var"))?;
                }
            }
            other => bail!("Unsupported analysis provider in config: {other}"),
        }

        if self.bus_capacity == 0 {
            self.bus_capacity = AppConfig::default().bus_capacity;
        }
        Ok(self)
    }

    fn apply_env_overrides(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(v) = var("APP_ENV") {
            self.environment = v;
        }
        if let Some(v) = var("STORE_DIR") {
            self.store.dir = Some(PathBuf::from(v));
        }
        if let Some(v) = var("ANALYSIS_PROVIDER") {
            self.analysis.provider = v;
        }
        if let Some(v) = var("HOD_BASE_URL") {
            self.analysis.base_url = v;
        }
        if let Some(v) = var("REPORT_WEBHOOK_URL") {
            self.report.webhook_url = Some(v);
        }
    }
}
