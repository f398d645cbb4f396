pub mod api;
pub mod config;
pub mod dashboard;
pub mod data_structures;
pub mod render;
pub mod startup;

use anyhow::Context;
use stockchat::ask_ai::{AnalysisProvider, ChatCompletionClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stockchat=info,stockchat_dashboard=info,tower_http=info")),
        )
        .with_target(false)
        .init();

    let app_config = config::AppConfig::load()?;

    tracing::info!("Starting stockchat-dashboard");
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.listen_addr(),
        tickers = ?app_config.tickers,
        "Loaded configuration"
    );

    let analysis_config = app_config.analysis_config();
    let page = startup::prepare_page(&app_config, |credentials| {
        let client = ChatCompletionClient::new(credentials, analysis_config)?;
        Ok(Box::new(client) as Box<dyn AnalysisProvider>)
    })
    .await?;

    let app = api::router(api::AppState::new(render::render_page(&page)));

    let addr = app_config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(%addr, "Dashboard listening");
    axum::serve(listener, app).await?;

    Ok(())
}
