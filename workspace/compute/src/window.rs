//! Display window selection and presentation of the forecast table.

use chrono::{Days, NaiveDate};
use polars::prelude::*;
use tracing::{debug, instrument};

use crate::error::{ComputeError, Result};
use crate::model::ForecastPoint;
use crate::series::CanonicalSeries;

/// Default length of the display window when no end date is given.
pub const DEFAULT_WINDOW_DAYS: u64 = 90;

/// Default cap on the forecast horizon, counted in days from the first
/// historical date through the window end.
pub const DEFAULT_MAX_HORIZON_DAYS: i64 = 36_525;

pub const DATE_LABEL: &str = "Date";
pub const PREDICTED_LABEL: &str = "Predicted Sales";
pub const LOWER_LABEL: &str = "Lower Estimate";
pub const UPPER_LABEL: &str = "Upper Estimate";

/// `date + days`, or `InvalidWindow` past the last representable date.
pub(crate) fn days_after(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days)).ok_or_else(|| {
        ComputeError::InvalidWindow(format!(
            "{} days after {} is beyond the supported date range",
            days, date
        ))
    })
}

/// The user-chosen slice of the horizon that is shown and reported.
///
/// Always starts after the last historical date and never ends before it
/// starts. It does not change how much history the model trains on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DisplayWindow {
    /// Validates an explicit window against the history, with the default
    /// horizon cap.
    pub fn new(series: &CanonicalSeries, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        Self::bounded(series, start_date, end_date, DEFAULT_MAX_HORIZON_DAYS)
    }

    /// Validates an explicit window. The horizon from the first historical
    /// date through `end_date` may span at most `max_horizon_days` days.
    pub fn bounded(
        series: &CanonicalSeries,
        start_date: NaiveDate,
        end_date: NaiveDate,
        max_horizon_days: i64,
    ) -> Result<Self> {
        let (first, last) = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ComputeError::EmptyDataset),
        };
        if start_date <= last {
            return Err(ComputeError::InvalidWindow(format!(
                "start date {} must be after the last historical date {}",
                start_date, last
            )));
        }
        if end_date < start_date {
            return Err(ComputeError::InvalidWindow(format!(
                "end date {} must not be before start date {}",
                end_date, start_date
            )));
        }
        let horizon_days = (end_date - first).num_days() + 1;
        if horizon_days > max_horizon_days {
            return Err(ComputeError::InvalidWindow(format!(
                "forecast from {} to {} spans {} days, the limit is {}",
                first, end_date, horizon_days, max_horizon_days
            )));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Fills missing dates with the defaults (the day after the history for
    /// the start, 90 days after the history for the end) and validates.
    pub fn resolve(
        series: &CanonicalSeries,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self> {
        Self::resolve_bounded(series, start_date, end_date, DEFAULT_MAX_HORIZON_DAYS)
    }

    /// [`DisplayWindow::resolve`] with an explicit horizon cap.
    pub fn resolve_bounded(
        series: &CanonicalSeries,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        max_horizon_days: i64,
    ) -> Result<Self> {
        let last = series.last_date().ok_or(ComputeError::EmptyDataset)?;
        let start = match start_date {
            Some(start) => start,
            None => days_after(last, 1)?,
        };
        let end = match end_date {
            Some(end) => end,
            None => days_after(last, DEFAULT_WINDOW_DAYS)?.max(start),
        };
        Self::bounded(series, start, end, max_horizon_days)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Keeps the points inside the window, in their original order.
pub fn filter_window(points: &[ForecastPoint], window: &DisplayWindow) -> Vec<ForecastPoint> {
    points
        .iter()
        .filter(|p| window.contains(p.timestamp))
        .copied()
        .collect()
}

/// Builds the display table of the window with presentation labels.
#[instrument(skip(points), fields(points = points.len()))]
pub fn format_window(points: &[ForecastPoint], window: &DisplayWindow) -> Result<DataFrame> {
    let filtered = filter_window(points, window);
    debug!("Formatting {} points inside the window", filtered.len());

    let df = DataFrame::new(vec![
        Series::new(
            DATE_LABEL.into(),
            filtered.iter().map(|p| p.timestamp).collect::<Vec<NaiveDate>>(),
        )
        .into(),
        Series::new(
            PREDICTED_LABEL.into(),
            filtered.iter().map(|p| p.point_estimate).collect::<Vec<f64>>(),
        )
        .into(),
        Series::new(
            LOWER_LABEL.into(),
            filtered.iter().map(|p| p.lower_bound).collect::<Vec<f64>>(),
        )
        .into(),
        Series::new(
            UPPER_LABEL.into(),
            filtered.iter().map(|p| p.upper_bound).collect::<Vec<f64>>(),
        )
        .into(),
    ])?;

    Ok(df)
}
