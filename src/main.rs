// Main entry point - Dependency injection, polling and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::advisory_provider::AdvisoryProvider;
use crate::application::dashboard_service::DashboardService;
use crate::application::feed_provider::FeedProvider;
use crate::application::monitor_state::{AdvisoryPolicy, MonitorState};
use crate::application::orchestrator::{PollingOptions, PollingOrchestrator};
use crate::domain::normalizer::FeedNormalizer;
use crate::domain::quality::QualityClassifier;
use crate::infrastructure::config::load_config;
use crate::infrastructure::consentium_client::ConsentiumFeedProvider;
use crate::infrastructure::gemini_advisor::GeminiAdvisoryProvider;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;

    // Create providers (infrastructure layer)
    let feed: Arc<dyn FeedProvider> = Arc::new(ConsentiumFeedProvider::new(
        config.feed.endpoint(),
        config.feed.timeout(),
    )?);

    let advisor: Option<Arc<dyn AdvisoryProvider>> = match config.advisory.api_key() {
        Some(api_key) => Some(Arc::new(GeminiAdvisoryProvider::new(
            config.advisory.base_url.clone(),
            api_key.to_string(),
            config.advisory.model.clone(),
            config.advisory.timeout(),
        )?)),
        None => {
            tracing::warn!("Advisory API key not set, using rule-based recommendations only");
            None
        }
    };

    // Create orchestrator and services (application layer)
    let state = MonitorState::new(
        config.polling.history_capacity,
        AdvisoryPolicy {
            enabled: advisor.is_some(),
            mode: config.advisory.mode,
            cooldown: config.polling.advisory_cooldown(),
            forecast_window: config.advisory.forecast_window,
        },
    );
    let feed_enabled = feed.is_enabled();
    let advisory_enabled = advisor.is_some();
    let (orchestrator, snapshots) = PollingOrchestrator::new(
        feed,
        advisor,
        FeedNormalizer::new(config.quality.display_offset()),
        PollingOptions {
            live_interval: config.polling.live_interval(),
            fetch_timeout: config.feed.timeout(),
            advisory_timeout: config.advisory.timeout(),
        },
        state,
    );
    let dashboard_service = DashboardService::new(
        snapshots,
        QualityClassifier::new(config.quality.ph_aware),
        feed_enabled,
        advisory_enabled,
    );
    let poller = orchestrator.start();

    // Build router (presentation layer)
    let router = build_router(Arc::new(AppState { dashboard_service }));

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting aquasense-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    poller.stop().await;
    Ok(())
}
