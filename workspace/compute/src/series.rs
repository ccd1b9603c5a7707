//! Canonical time series built from uploaded records.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::ingest::RawRecord;

/// Date-only layouts, day-first where the order is ambiguous.
///
/// Order matters: `%Y` accepts any number of digits, so the two-digit year
/// layouts are tried first and year-first layouts last.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

/// Layouts carrying a time of day; the time part is dropped.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Parses a date string using the day-first convention.
///
/// `01/02/2024` is the 1st of February. Year-first strings such as
/// `2024-02-01` are unambiguous and read as written.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// A single observation of the canonical series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: NaiveDate,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: NaiveDate, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered `(timestamp, value)` observations used as the only model input.
///
/// Points are sorted non-decreasing by timestamp. Duplicated dates and gaps
/// are kept as uploaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalSeries {
    points: Vec<SeriesPoint>,
}

impl CanonicalSeries {
    /// Builds a series from points in any order.
    pub fn from_points(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Earliest timestamp in the series.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.timestamp)
    }

    /// Latest timestamp in the series.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.timestamp)
    }

    pub fn timestamps(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Converts raw records into the canonical series.
///
/// Missing or non-numeric sales become `NaN` and are left for the model to
/// reject. An unparseable date aborts the whole conversion.
#[instrument(skip(records), fields(records = records.len()))]
pub fn normalize(records: &[RawRecord]) -> Result<CanonicalSeries> {
    let points = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let raw = record.date.as_deref().unwrap_or_default();
            let timestamp = parse_day_first(raw).ok_or_else(|| ComputeError::DateParse {
                row: i + 1,
                value: raw.to_string(),
            })?;
            Ok(SeriesPoint::new(timestamp, record.sales.unwrap_or(f64::NAN)))
        })
        .collect::<Result<Vec<_>>>()?;

    let series = CanonicalSeries::from_points(points);
    debug!(
        "Normalized {} points from {:?} to {:?}",
        series.len(),
        series.first_date(),
        series.last_date()
    );
    Ok(series)
}
