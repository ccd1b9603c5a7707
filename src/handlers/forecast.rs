use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
};
use axum_valid::Valid;
use common::{ForecastResponse, UploadSummaryResponse};
use compute::error::ComputeError;
use compute::model::Forecaster;
use compute::pipeline::{load_series, run_pipeline, ForecastRun, UploadSummary};
use compute::window::DisplayWindow;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

use crate::helpers::converters::{convert_forecast_run, convert_upload_summary};
use crate::helpers::errors::{compute_error_response, internal_error_response, ApiError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ForecastQuery};

/// Runs a synchronous pipeline step on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> compute::error::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(compute_error_response(&e)),
        Err(join_error) => Err(internal_error_response(format!(
            "Forecast task did not complete: {}",
            join_error
        ))),
    }
}

/// Ingests, validates and normalizes the upload, then fits and runs the
/// forecast over the requested window.
fn forecast_upload(
    forecaster: Arc<dyn Forecaster + Send + Sync>,
    query: ForecastQuery,
    max_horizon_days: i64,
    body: Bytes,
) -> impl FnOnce() -> compute::error::Result<ForecastRun> + Send + 'static {
    move || {
        let series = load_series(&body)?;
        let window = DisplayWindow::resolve_bounded(
            &series,
            query.start_date,
            query.end_date,
            max_horizon_days,
        )?;
        debug!(
            "Forecasting {} rows for window {} to {}",
            series.len(),
            window.start_date(),
            window.end_date()
        );
        run_pipeline(forecaster.as_ref(), series, window)
    }
}

/// Upload a sales history and get its summary
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "forecast",
    request_body(content = String, description = "CSV with a header row containing Date and Sales columns", content_type = "text/csv"),
    responses(
        (status = 200, description = "File uploaded successfully", body = ApiResponse<UploadSummaryResponse>),
        (status = 400, description = "Upload is not readable as CSV", body = ErrorResponse),
        (status = 422, description = "Missing columns, unparseable dates or no rows", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn upload_dataset(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<UploadSummaryResponse>>), ApiError> {
    trace!("Entering upload_dataset function");

    let summary = run_blocking(move || {
        let series = load_series(&body)?;
        UploadSummary::from_series(&series)
    })
    .await?;

    info!(
        "Upload accepted: {} rows from {} to {}",
        summary.rows, summary.first_date, summary.last_date
    );
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(
            convert_upload_summary(&summary),
            "File uploaded successfully",
        )),
    ))
}

/// Forecast an uploaded sales history
#[utoipa::path(
    post,
    path = "/api/v1/forecast",
    tag = "forecast",
    params(ForecastQuery),
    request_body(content = String, description = "CSV with a header row containing Date and Sales columns", content_type = "text/csv"),
    responses(
        (status = 200, description = "Forecast generated successfully", body = ApiResponse<ForecastResponse>),
        (status = 400, description = "Malformed upload or invalid window", body = ErrorResponse),
        (status = 422, description = "Invalid data or the model could not be fitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn run_forecast(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<ForecastResponse>>), ApiError> {
    trace!("Entering run_forecast function");

    let task = forecast_upload(
        state.forecaster.clone(),
        query,
        state.settings.max_horizon_days,
        body,
    );
    let response = run_blocking(move || {
        let run = task()?;
        convert_forecast_run(&run)
    })
    .await?;

    info!(
        "Forecast generated: {} rows from {} to {}",
        response.rows.len(),
        response.window.start_date,
        response.window.end_date
    );
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(response, "Forecast generated successfully")),
    ))
}

/// Render the forecast of an uploaded sales history as an HTML chart
#[utoipa::path(
    post,
    path = "/api/v1/forecast/chart",
    tag = "forecast",
    params(ForecastQuery),
    request_body(content = String, description = "CSV with a header row containing Date and Sales columns", content_type = "text/csv"),
    responses(
        (status = 200, description = "Chart rendered", body = String, content_type = "text/html"),
        (status = 400, description = "Malformed upload or invalid window", body = ErrorResponse),
        (status = 422, description = "Invalid data or the model could not be fitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn render_forecast_chart(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    body: Bytes,
) -> Result<Html<String>, ApiError> {
    trace!("Entering render_forecast_chart function");

    let task = forecast_upload(
        state.forecaster.clone(),
        query,
        state.settings.max_horizon_days,
        body,
    );
    let html = run_blocking(move || -> Result<String, ComputeError> {
        let run = task()?;
        Ok(run.chart_html())
    })
    .await?;

    debug!("Rendered chart of {} bytes", html.len());
    Ok(Html(html))
}
