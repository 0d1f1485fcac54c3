use std::sync::Arc;

use anyhow::Context;

use bolt_responder::classifier::create_classifier;
use bolt_responder::config::AppConfig;
use bolt_responder::labels::LabelMap;
use bolt_responder::llm::create_provider;
use bolt_responder::responder::{EmailResponder, ResponderConfig};
use bolt_responder::server::analyze_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment still applies.
    dotenvy::dotenv().ok();

    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    eprintln!("📬 Bolt Responder v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!(
        "   Classifier: {} ({})",
        config.classifier.backend.as_str(),
        config.classifier.base_url
    );
    eprintln!("   Analyze API: http://0.0.0.0:{}/analyze-label\n", config.port);

    let classifier = create_classifier(&config.classifier)?;
    let llm = create_provider(&config.llm)?;

    let responder = Arc::new(EmailResponder::new(
        classifier,
        llm,
        LabelMap::default(),
        ResponderConfig {
            classify_timeout: config.classify_timeout,
            generate_timeout: config.generate_timeout,
        },
    ));
    let app = analyze_routes(responder);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Analyze server started");
    axum::serve(listener, app).await?;

    Ok(())
}
