use crate::{
    models::{PriceRow, PriceTable},
    utils::{Logger, Timer},
};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

const REQUIRED_COLUMNS: [&str; 4] = ["ticker", "date", "open", "close"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook {0} has no worksheets")]
    NoWorksheet(PathBuf),
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Load a price table from disk.
///
/// Workbooks (`.xlsx`, `.xls`, `.ods`, ...) are read from their first
/// worksheet; any other file is read as CSV.
pub fn load_price_table(path: impl AsRef<Path>) -> Result<PriceTable, DataError> {
    let path = path.as_ref();
    let logger = Logger::new("CSV_SERVICE");
    let timer = Timer::start(&format!("load {}", path.display()));

    let table = if is_workbook(path) {
        read_workbook(path)?
    } else {
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_price_table(file)?
    };

    if table.is_empty() {
        logger.warn(&format!("{} contains no price rows", path.display()));
    } else {
        logger.info(&format!(
            "Loaded {} rows for {} tickers from {}",
            table.len(),
            table.tickers().len(),
            path.display()
        ));
    }
    timer.log_elapsed();

    Ok(table)
}

/// Parse CSV price data from any reader.
///
/// Headers are matched case-insensitively, extra columns are ignored and row
/// order is preserved.
pub fn read_price_table<R: Read>(reader: R) -> Result<PriceTable, DataError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let [ticker_idx, date_idx, open_idx, close_idx] =
        column_positions(&headers.iter().collect::<Vec<_>>())?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or_default();

        rows.push(PriceRow {
            ticker: cell(ticker_idx).to_string(),
            date: parse_date(cell(date_idx)).ok_or_else(|| invalid(row, "date", cell(date_idx)))?,
            open: parse_price(cell(open_idx)).ok_or_else(|| invalid(row, "open", cell(open_idx)))?,
            close: parse_price(cell(close_idx))
                .ok_or_else(|| invalid(row, "close", cell(close_idx)))?,
        });
    }

    Ok(PriceTable::new(rows))
}

/// Read the first worksheet of a workbook, first row as headers
pub fn read_workbook(path: &Path) -> Result<PriceTable, DataError> {
    if !path.is_file() {
        return Err(DataError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::NoWorksheet(path.to_path_buf()))??;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let [ticker_idx, date_idx, open_idx, close_idx] = column_positions(&headers)?;

    let mut rows = Vec::new();
    for (index, cells) in sheet_rows.enumerate() {
        let row = index + 1;
        let cell = |idx: usize| cells.get(idx).unwrap_or(&Data::Empty);

        rows.push(PriceRow {
            ticker: cell(ticker_idx).to_string().trim().to_string(),
            date: cell_date(cell(date_idx))
                .ok_or_else(|| invalid(row, "date", &cell(date_idx).to_string()))?,
            open: cell_price(cell(open_idx))
                .ok_or_else(|| invalid(row, "open", &cell(open_idx).to_string()))?,
            close: cell_price(cell(close_idx))
                .ok_or_else(|| invalid(row, "close", &cell(close_idx).to_string()))?,
        });
    }

    Ok(PriceTable::new(rows))
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Positions of ticker, date, open and close; header case is ignored
fn column_positions<S: AsRef<str>>(headers: &[S]) -> Result<[usize; 4], DataError> {
    let column_index = |name: &'static str| {
        headers
            .iter()
            .position(|header| header.as_ref().eq_ignore_ascii_case(name))
            .ok_or(DataError::MissingColumn(name))
    };
    Ok([
        column_index(REQUIRED_COLUMNS[0])?,
        column_index(REQUIRED_COLUMNS[1])?,
        column_index(REQUIRED_COLUMNS[2])?,
        column_index(REQUIRED_COLUMNS[3])?,
    ])
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(text) => parse_date(text.trim()),
        other => other.as_date(),
    }
}

fn cell_price(cell: &Data) -> Option<f64> {
    match cell {
        Data::String(text) => parse_price(text.trim()),
        Data::Float(_) | Data::Int(_) => cell.as_f64(),
        _ => None,
    }
}

fn invalid(row: usize, column: &'static str, value: &str) -> DataError {
    DataError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn parse_price(value: &str) -> Option<f64> {
    value.parse::<f64>().ok()
}
