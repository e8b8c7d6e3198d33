use anyhow::{Context, Result};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_backend::{ConsultService, LogStore};
use triage_core::{AnthropicModelClient, PREAMBLE};

mod endpoint;
mod payment;
use endpoint::create_router;
use payment::RecipientGate;

// Environment variables
static BACKEND_HOST: std::sync::LazyLock<String> = std::sync::LazyLock::new(|| {
    std::env::var("BACKEND_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
});
static BACKEND_PORT: std::sync::LazyLock<String> = std::sync::LazyLock::new(|| {
    std::env::var("BACKEND_PORT").unwrap_or_else(|_| "8080".to_string())
});
static RECORDS_DIR: std::sync::LazyLock<String> = std::sync::LazyLock::new(|| {
    std::env::var("MEDICAL_RECORDS_DIR").unwrap_or_else(|_| "medical_records".to_string())
});

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "HTTP server for the symptom-consultation service")]
struct Cli {
    /// Override the per-user log directory (defaults to MEDICAL_RECORDS_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Both externals are fatal when missing; fail before binding.
    let model = AnthropicModelClient::from_env(PREAMBLE)
        .context("ANTHROPIC_API_KEY must be set (model provider credential)")?;
    let gate = RecipientGate::from_env()?;

    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&*RECORDS_DIR));
    let store = Arc::new(LogStore::new(data_dir));
    store.init();

    let service = Arc::new(ConsultService::new(store, Arc::new(model)));

    let app = create_router(service, gate).layer(build_cors_layer());

    let bind_addr = format!("{}:{}", &*BACKEND_HOST, &*BACKEND_PORT);
    tracing::info!(addr = %bind_addr, "consultation server starting");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
