use std::sync::Arc;
use std::time::Duration;

use wellness_check::analysis::{AnalysisGateway, GatewayConfig};
use wellness_check::assessment::{Questionnaire, SessionRegistry, spawn_eviction_task};
use wellness_check::config::AppConfig;
use wellness_check::llm::create_provider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🌿 Wellness Check v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Wellness model: {} ({})",
        config.text_llm.model, config.text_llm.backend
    );
    eprintln!(
        "   Vision model: {} ({})",
        config.vision_llm.model, config.vision_llm.backend
    );
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    // ── Providers ────────────────────────────────────────────────────────
    let text_llm = create_provider(&config.text_llm)?;
    let vision_llm = create_provider(&config.vision_llm)?;

    let gateway = Arc::new(AnalysisGateway::new(
        text_llm,
        vision_llm,
        GatewayConfig::default(),
    ));

    // ── Sessions ─────────────────────────────────────────────────────────
    let questionnaire = Arc::new(Questionnaire::default_checkup());
    eprintln!("   Questions: {}\n", questionnaire.len());
    let registry = Arc::new(
        SessionRegistry::new(questionnaire, gateway.clone()).with_limits(config.sessions),
    );
    spawn_eviction_task(registry.clone(), Duration::from_secs(60));

    let app = wellness_check::app(registry, gateway);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Wellness Check server started");
    axum::serve(listener, app).await?;

    Ok(())
}
