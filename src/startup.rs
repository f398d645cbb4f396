use crate::config::AppConfig;
use crate::dashboard::build_page;
use crate::data_structures::PageModel;
use anyhow::Context;
use stockchat::ask_ai::{AnalysisProvider, analyze_or_report};
use stockchat::services::{Credentials, load_price_table};

/// Run the one-shot startup pipeline and return the finished page model.
///
/// Order is fixed: credentials, price data, provider, analysis. A failure in
/// either of the first two stops startup before any network call is made;
/// an analysis failure only changes the text shown on the page.
pub async fn prepare_page<F>(config: &AppConfig, make_provider: F) -> anyhow::Result<PageModel>
where
    F: FnOnce(Credentials) -> anyhow::Result<Box<dyn AnalysisProvider>>,
{
    let credentials = config
        .credentials_source()
        .load()
        .with_context(|| format!("loading credentials from {}", config.credentials_path.display()))?;

    let table = load_price_table(&config.data_path)
        .with_context(|| format!("loading price data from {}", config.data_path.display()))?;

    let provider = make_provider(credentials)?;

    tracing::info!(rows = table.len(), "Requesting analysis of price table");
    let analysis = analyze_or_report(provider.as_ref(), &table).await;

    let page = build_page(&config.tickers, &table, &analysis);
    tracing::info!(
        charts = page.charts.len(),
        analysis_lines = page.analysis.len(),
        "Dashboard page built"
    );
    Ok(page)
}
