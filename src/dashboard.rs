use crate::data_structures::{ChartModel, LineSeries, PageModel, SeriesPoint};
use stockchat::models::PriceTable;

pub const PAGE_TITLE: &str = "Stock Data Dashboard";

/// Assemble the page: one chart per ticker, then the analysis lines.
///
/// Tickers missing from the table still get a chart, with empty series.
pub fn build_page(tickers: &[String], table: &PriceTable, analysis: &str) -> PageModel {
    let charts: Vec<ChartModel> = tickers
        .iter()
        .map(|ticker| build_chart(ticker, table))
        .collect();

    let empty = charts.iter().filter(|chart| chart.open.is_empty()).count();
    if empty > 0 {
        tracing::warn!(empty, "Some configured tickers have no rows in the price table");
    }

    PageModel {
        title: PAGE_TITLE.to_string(),
        charts,
        analysis: split_analysis(analysis),
    }
}

pub fn build_chart(ticker: &str, table: &PriceTable) -> ChartModel {
    let (open, close): (Vec<_>, Vec<_>) = table
        .rows_for(ticker)
        .map(|row| {
            (
                SeriesPoint { date: row.date, value: row.open },
                SeriesPoint { date: row.date, value: row.close },
            )
        })
        .unzip();

    ChartModel {
        ticker: ticker.to_string(),
        title: format!("{} Stock Prices", ticker),
        open: LineSeries { name: format!("{} Open", ticker), points: open },
        close: LineSeries { name: format!("{} Close", ticker), points: close },
    }
}

/// Non-blank lines of the analysis text, trimmed, in order
pub fn split_analysis(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
