use std::sync::Arc;

use nanochat::{
    config::AppConfig,
    history::InMemoryMessageStore,
    http::{self, AppState},
    model::{ResponseGenerator, SimulatedModel},
    orchestrator::ChatSession,
    safety::SafetyPolicy,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let model = build_model(&config);
    let session = Arc::new(ChatSession::new(
        model,
        Arc::new(InMemoryMessageStore::default()),
        config.safety_settings(),
    ));

    if !session.initialize().await? {
        warn!("on-device model unavailable; replies will report an error");
    }

    let app = http::router(AppState { session });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("nanochat HTTP API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

fn build_model(config: &AppConfig) -> Arc<dyn ResponseGenerator> {
    if config.simulate_init_failure {
        warn!("SIMULATE_INIT_FAILURE is set; model initialization will fail");
    }
    info!(
        processing_delay_ms = config.processing_delay_ms,
        chunk_delay_ms = config.chunk_delay_ms,
        "using simulated on-device model"
    );
    Arc::new(
        SimulatedModel::new(SafetyPolicy::default(), config.pacing())
            .with_init_failure(config.simulate_init_failure),
    )
}
