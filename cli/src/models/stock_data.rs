use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

impl PriceRow {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            open,
            close,
        }
    }
}

/// Ordered price rows as loaded from the input file.
///
/// Rows keep file order and are never deduplicated; per-ticker access is a
/// borrowed view over the same rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(rows: Vec<PriceRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one ticker, in table order
    pub fn rows_for<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a PriceRow> + 'a {
        self.rows.iter().filter(move |row| row.ticker == ticker)
    }

    /// Copy of the rows for one ticker; the symbol is trimmed and upper-cased first
    pub fn for_ticker(&self, ticker: &str) -> PriceTable {
        let ticker = ticker.trim().to_uppercase();
        self.rows_for(&ticker).cloned().collect()
    }

    /// Distinct tickers in order of first appearance
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.ticker.as_str()) {
                seen.push(row.ticker.as_str());
            }
        }
        seen
    }

    /// Write the table back out as `ticker,date,open,close` CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["ticker", "date", "open", "close"])?;
        for row in &self.rows {
            csv_writer.write_record(&[
                row.ticker.clone(),
                row.date.format(DATE_FORMAT).to_string(),
                row.open.to_string(),
                row.close.to_string(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Render an aligned plain-text table with a leading row index.
    ///
    /// This is the form the table takes inside the analysis prompt.
    pub fn to_text_table(&self) -> String {
        let header = ["", "ticker", "date", "open", "close"];
        let body: Vec<[String; 5]> = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                [
                    index.to_string(),
                    row.ticker.clone(),
                    row.date.format(DATE_FORMAT).to_string(),
                    format_price(row.open),
                    format_price(row.close),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        let mut lines = Vec::with_capacity(body.len() + 1);
        lines.push(join_aligned(header.iter().copied(), &widths));
        for cells in &body {
            lines.push(join_aligned(cells.iter().map(String::as_str), &widths));
        }
        lines.join("\n")
    }
}

impl FromIterator<PriceRow> for PriceTable {
    fn from_iter<I: IntoIterator<Item = PriceRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn join_aligned<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Whole prices keep one decimal so the column reads as numeric
fn format_price(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn sample_table() -> PriceTable {
        PriceTable::new(vec![
            PriceRow::new("AAPL", date("2024-01-02"), 100.0, 105.0),
            PriceRow::new("MSFT", date("2024-01-02"), 200.0, 198.0),
            PriceRow::new("AAPL", date("2024-01-03"), 105.5, 104.25),
        ])
    }

    #[test]
    fn test_rows_for_keeps_table_order() {
        let table = sample_table();
        let aapl: Vec<_> = table.rows_for("AAPL").map(|r| r.date).collect();
        assert_eq!(aapl, vec![date("2024-01-02"), date("2024-01-03")]);
    }

    #[test]
    fn test_rows_for_absent_ticker_is_empty() {
        let table = sample_table();
        assert_eq!(table.rows_for("GOOG").count(), 0);
    }

    #[test]
    fn test_for_ticker_normalizes_symbol() {
        let table = sample_table();
        let aapl = table.for_ticker(" aapl ");
        assert_eq!(aapl.len(), 2);
        assert!(aapl.rows().iter().all(|row| row.ticker == "AAPL"));
        assert_eq!(aapl.rows()[1].close, 104.25);
        assert!(table.for_ticker("goog").is_empty());
    }

    #[test]
    fn test_tickers_in_first_appearance_order() {
        assert_eq!(sample_table().tickers(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_write_csv_layout() {
        let mut out = Vec::new();
        sample_table().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ticker,date,open,close");
        assert_eq!(lines[1], "AAPL,2024-01-02,100,105");
        assert_eq!(lines[3], "AAPL,2024-01-03,105.5,104.25");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_text_table_is_aligned_and_indexed() {
        let text = sample_table().to_text_table();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "   ticker        date   open   close");
        assert_eq!(lines[1], "0    AAPL  2024-01-02  100.0   105.0");
        assert_eq!(lines[3], "2    AAPL  2024-01-03  105.5  104.25");
    }

    #[test]
    fn test_text_table_empty() {
        assert_eq!(PriceTable::default().to_text_table(), "  ticker  date  open  close");
    }
}
