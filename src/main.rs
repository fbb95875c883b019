//! H8 Marketplace - storefront demo service

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use h8_marketplace::api::{self, ApiState};
use h8_marketplace::app::App;
use h8_marketplace::assistant::ScriptedAssistant;
use h8_marketplace::config::Config;
use h8_marketplace::prefs::PrefsStore;
use h8_marketplace::seed;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let prefs = PrefsStore::load(config.prefs_path.clone(), config.default_dark_mode);
    let app = Arc::new(RwLock::new(App::new(seed::catalog(), seed::ledger(), prefs)));
    let state = ApiState { app, assistant: Arc::new(ScriptedAssistant) };

    let router = api::router(state);
    tracing::info!("🚀 H8 Marketplace listening on 0.0.0.0:{}", config.port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?,
        router,
    )
    .await?;
    Ok(())
}
