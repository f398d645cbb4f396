use crate::ask_ai::{
    client::{AnalysisError, ChatCompletionClient},
    formatters::build_messages,
};
use crate::models::PriceTable;
use crate::utils::Timer;
use async_trait::async_trait;

/// Source of the analysis text for a price table.
///
/// The dashboard holds this as a trait object so tests can stand in for the
/// remote model.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn fetch_analysis(&self, table: &PriceTable) -> Result<String, AnalysisError>;
}

#[async_trait]
impl AnalysisProvider for ChatCompletionClient {
    async fn fetch_analysis(&self, table: &PriceTable) -> Result<String, AnalysisError> {
        let messages = build_messages(&self.config().system_prompt, table);
        self.complete(&messages).await
    }
}

pub fn format_analysis_error(error: &AnalysisError) -> String {
    format!("An error occurred: {}", error)
}

/// Run the analysis once, turning any failure into display text
pub async fn analyze_or_report(provider: &dyn AnalysisProvider, table: &PriceTable) -> String {
    let timer = Timer::start("analysis request");
    let text = match provider.fetch_analysis(table).await {
        Ok(text) => text,
        Err(error) => {
            tracing::error!(%error, "Analysis request failed; showing error text instead");
            format_analysis_error(&error)
        }
    };
    timer.log_elapsed();
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceRow;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed(Result<&'static str, &'static str>, AtomicUsize);

    #[async_trait]
    impl AnalysisProvider for Fixed {
        async fn fetch_analysis(&self, table: &PriceTable) -> Result<String, AnalysisError> {
            self.1.fetch_add(table.len(), Ordering::SeqCst);
            self.0
                .map(String::from)
                .map_err(|e| AnalysisError::Transport(e.to_string()))
        }
    }

    fn table() -> PriceTable {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        PriceTable::new(vec![PriceRow::new("AAPL", date, 100.0, 105.0)])
    }

    #[tokio::test]
    async fn test_success_passes_text_through() {
        let provider = Fixed(Ok("Line one.\nLine two."), AtomicUsize::new(0));
        let text = analyze_or_report(&provider, &table()).await;
        assert_eq!(text, "Line one.\nLine two.");
        assert_eq!(provider.1.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_becomes_error_text() {
        let provider = Fixed(Err("connection refused"), AtomicUsize::new(0));
        let text = analyze_or_report(&provider, &table()).await;
        assert_eq!(text, "An error occurred: transport error: connection refused");
    }
}
