use chrono::NaiveDate;
use serde::Serialize;

// --- Page Model ---
// Built once at startup and never mutated afterwards.

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl LineSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// One chart per ticker: an open series and a close series over the same dates
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartModel {
    pub ticker: String,
    pub title: String,
    pub open: LineSeries,
    pub close: LineSeries,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageModel {
    pub title: String,
    pub charts: Vec<ChartModel>,
    pub analysis: Vec<String>,
}
