//! News enricher: binary entrypoint.
//! Boots the Axum HTTP server, spawns the enrichment workers, and mounts `/metrics`.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_enricher::metrics::Metrics;

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_enricher=info,ingest=info,report=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    // try_init: the deployment runtime may already have installed a subscriber.
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Recorder first, so metric descriptions land in the exporter.
    let metrics = Metrics::init()?;

    let (router, pipeline) = news_enricher::app()?;
    tracing::info!(
        environment = %pipeline.config().environment,
        "news enricher started"
    );

    Ok(router.merge(metrics.router()).into())
}
