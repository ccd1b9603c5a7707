use plotly::common::{Fill, Line, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use tracing::instrument;

use crate::model::ForecastPoint;
use crate::series::CanonicalSeries;

pub const HISTORY_TRACE: &str = "Historical Sales";
pub const PREDICTION_TRACE: &str = "Predicted Sales";
pub const BAND_TRACE: &str = "Confidence Interval";

/// Builds the forecast chart: history line, predicted line, and the shaded
/// band between the bounds, on one date axis.
pub fn forecast_plot(history: &CanonicalSeries, window_points: &[ForecastPoint]) -> Plot {
    let history_dates: Vec<String> = history
        .points()
        .iter()
        .map(|p| p.timestamp.to_string())
        .collect();
    let window_dates: Vec<String> = window_points
        .iter()
        .map(|p| p.timestamp.to_string())
        .collect();

    let history_trace = Scatter::new(history_dates, history.values())
        .mode(Mode::Lines)
        .name(HISTORY_TRACE)
        .line(Line::new().color("blue").width(2.0));

    let prediction_trace = Scatter::new(
        window_dates.clone(),
        window_points.iter().map(|p| p.point_estimate).collect::<Vec<f64>>(),
    )
    .mode(Mode::Lines)
    .name(PREDICTION_TRACE)
    .line(Line::new().color("green").width(2.0));

    // the band is drawn by filling from the lower bound up to the upper trace
    let upper_trace = Scatter::new(
        window_dates.clone(),
        window_points.iter().map(|p| p.upper_bound).collect::<Vec<f64>>(),
    )
    .mode(Mode::Lines)
    .name("Upper Estimate")
    .show_legend(false)
    .line(Line::new().color("lightgreen").width(0.0));

    let lower_trace = Scatter::new(
        window_dates,
        window_points.iter().map(|p| p.lower_bound).collect::<Vec<f64>>(),
    )
    .mode(Mode::Lines)
    .name(BAND_TRACE)
    .fill(Fill::ToNextY)
    .fill_color("rgba(144, 238, 144, 0.4)")
    .line(Line::new().color("lightgreen").width(0.0));

    let layout = Layout::new()
        .title(Title::with_text("Sales Forecast"))
        .x_axis(Axis::new().title(Title::with_text("Date")))
        .y_axis(Axis::new().title(Title::with_text("Sales")))
        .height(500);

    let mut plot = Plot::new();
    plot.add_trace(history_trace);
    plot.add_trace(upper_trace);
    plot.add_trace(lower_trace);
    plot.add_trace(prediction_trace);
    plot.set_layout(layout);
    plot
}

/// Renders the forecast chart as a self-contained HTML page.
#[instrument(skip(history, window_points), fields(history = history.len(), window = window_points.len()))]
pub fn render_chart(history: &CanonicalSeries, window_points: &[ForecastPoint]) -> String {
    forecast_plot(history, window_points).to_html()
}
