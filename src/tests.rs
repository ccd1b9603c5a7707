use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse};
use crate::test_utils::{
    init_test_tracing, setup_test_app, setup_test_app_with_horizon, setup_test_app_with_limit,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use common::{DateRange, ForecastResponse, UploadSummaryResponse};
use compute::testing::{
    EchoForecaster, FailingForecaster, RecordingForecaster, UnorderedForecaster, THREE_DAY_CSV,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn assert_error(response: &axum_test::TestResponse, status: StatusCode, code: &str) {
    response.assert_status(status);
    let body: ErrorResponse = response.json();
    assert!(!body.success);
    assert_eq!(body.code, code, "unexpected error: {}", body.error);
}

#[tokio::test]
async fn test_health_check() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.model, "recording");
}

#[tokio::test]
async fn test_upload_summary() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.post("/api/v1/uploads").text(THREE_DAY_CSV).await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<UploadSummaryResponse> = response.json();
    assert!(body.success);
    assert_eq!(body.message, "File uploaded successfully");
    assert_eq!(body.data.rows, 3);
    assert_eq!(
        body.data.historical_range,
        DateRange::new(date(2024, 1, 1), date(2024, 1, 3))
    );
    assert_eq!(
        body.data.default_window,
        DateRange::new(date(2024, 1, 4), date(2024, 4, 2))
    );
}

#[tokio::test]
async fn test_missing_column_is_rejected_before_forecasting() {
    let _guard = init_test_tracing();
    let forecaster = RecordingForecaster::default();
    let server = TestServer::new(setup_test_app(forecaster.clone())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .text("Date,Revenue\n01/01/2024,100\n")
        .await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR");
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("Sales"));
    assert_eq!(forecaster.fit_calls(), 0);
}

#[tokio::test]
async fn test_upload_missing_column() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.post("/api/v1/uploads").text("Sales\n100\n").await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR");
}

#[tokio::test]
async fn test_unparseable_date() {
    let _guard = init_test_tracing();
    let forecaster = RecordingForecaster::default();
    let server = TestServer::new(setup_test_app(forecaster.clone())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .text("Date,Sales\n01/01/2024,100\nyesterday,110\n")
        .await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "DATE_PARSE_ERROR");
    let body: ErrorResponse = response.json();
    assert!(body.error.contains("yesterday"));
    assert_eq!(forecaster.fit_calls(), 0);
}

#[tokio::test]
async fn test_empty_upload_is_malformed() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.post("/api/v1/uploads").text("").await;

    assert_error(&response, StatusCode::BAD_REQUEST, "MALFORMED_UPLOAD");
}

#[tokio::test]
async fn test_header_only_upload_is_empty_dataset() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.post("/api/v1/forecast").text("Date,Sales\n").await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_DATASET");
}

#[tokio::test]
async fn test_three_day_forecast() {
    let _guard = init_test_tracing();
    let forecaster = RecordingForecaster::default();
    let server = TestServer::new(setup_test_app(forecaster.clone())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("start_date", "2024-01-04")
        .add_query_param("end_date", "2024-01-06")
        .text(THREE_DAY_CSV)
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<ForecastResponse> = response.json();
    assert!(body.success);

    // the model sees the whole horizon, the response only the window
    assert_eq!(forecaster.fit_calls(), 1);
    assert_eq!(forecaster.requested_dates().len(), 6);
    let dates: Vec<NaiveDate> = body.data.rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 4), date(2024, 1, 5), date(2024, 1, 6)]);
    assert!(body
        .data
        .rows
        .iter()
        .all(|r| r.lower_estimate <= r.predicted_sales && r.predicted_sales <= r.upper_estimate));

    assert!(body.data.accuracy.available);
    assert_eq!(body.data.accuracy.mae, Some(5.0));
}

#[tokio::test]
async fn test_forecast_rows_use_display_labels() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("end_date", "2024-01-04")
        .text(THREE_DAY_CSV)
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let row = &body["data"]["rows"][0];
    assert_eq!(row["Date"], "2024-01-04");
    assert_eq!(row["Predicted Sales"], 100.0);
    assert_eq!(row["Lower Estimate"], 90.0);
    assert_eq!(row["Upper Estimate"], 110.0);
}

#[tokio::test]
async fn test_default_window_is_ninety_days() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(EchoForecaster::default())).unwrap();

    let response = server.post("/api/v1/forecast").text(THREE_DAY_CSV).await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<ForecastResponse> = response.json();
    assert_eq!(body.data.window, DateRange::new(date(2024, 1, 4), date(2024, 4, 2)));
    assert_eq!(body.data.rows.len(), 90);
    assert_eq!(body.data.accuracy.rmse, Some(0.0));
}

#[tokio::test]
async fn test_window_overlapping_history() {
    let _guard = init_test_tracing();
    let forecaster = RecordingForecaster::default();
    let server = TestServer::new(setup_test_app(forecaster.clone())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("start_date", "2024-01-02")
        .text(THREE_DAY_CSV)
        .await;

    assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_WINDOW");
    assert_eq!(forecaster.fit_calls(), 0);
}

#[tokio::test]
async fn test_window_beyond_horizon_limit() {
    let _guard = init_test_tracing();
    let forecaster = RecordingForecaster::default();
    let server = TestServer::new(setup_test_app(forecaster.clone())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("end_date", "9999-12-31")
        .text(THREE_DAY_CSV)
        .await;

    assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_WINDOW");
    assert_eq!(forecaster.fit_calls(), 0);
}

#[tokio::test]
async fn test_configured_horizon_limit() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app_with_horizon(RecordingForecaster::default(), 6)).unwrap();

    // 2024-01-01 through 2024-01-06 is six days
    let response = server
        .post("/api/v1/forecast")
        .add_query_param("end_date", "2024-01-06")
        .text(THREE_DAY_CSV)
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("end_date", "2024-01-07")
        .text(THREE_DAY_CSV)
        .await;
    assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_WINDOW");
}

#[tokio::test]
async fn test_last_date_at_end_of_calendar() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();
    let csv = "Date,Sales\n2024-01-01,1\n31/12/+262142,2\n";

    let response = server.post("/api/v1/uploads").text(csv).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_WINDOW");

    let response = server.post("/api/v1/forecast").text(csv).await;
    assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_WINDOW");
}

#[tokio::test]
async fn test_reversed_window_fails_validation() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("start_date", "2024-01-10")
        .add_query_param("end_date", "2024-01-05")
        .text(THREE_DAY_CSV)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_date() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .add_query_param("start_date", "04/01/2024")
        .text(THREE_DAY_CSV)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_failure() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(FailingForecaster)).unwrap();

    let response = server.post("/api/v1/forecast").text(THREE_DAY_CSV).await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "FORECASTING_FAILURE");
}

#[tokio::test]
async fn test_model_with_inverted_interval() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(UnorderedForecaster)).unwrap();

    let response = server.post("/api/v1/forecast").text(THREE_DAY_CSV).await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "FORECASTING_FAILURE");
}

#[tokio::test]
async fn test_unavailable_accuracy_is_not_an_error() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast")
        .text("Date,Sales\n01/01/2024,100\n02/01/2024,\n03/01/2024,105\n")
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<ForecastResponse> = response.json();
    assert!(!body.data.accuracy.available);
    assert_eq!(body.data.accuracy.rmse, None);
    assert!(body.data.accuracy.message.contains("2024-01-02"));
}

#[tokio::test]
async fn test_forecast_chart() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(EchoForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast/chart")
        .add_query_param("start_date", "2024-01-04")
        .add_query_param("end_date", "2024-01-06")
        .text(THREE_DAY_CSV)
        .await;

    response.assert_status(StatusCode::OK);
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let html = response.text();
    assert!(html.contains("Historical Sales"));
    assert!(html.contains("Predicted Sales"));
    assert!(html.contains("Confidence Interval"));
}

#[tokio::test]
async fn test_chart_reports_errors_as_json() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(EchoForecaster::default())).unwrap();

    let response = server
        .post("/api/v1/forecast/chart")
        .text("Date\n01/01/2024\n")
        .await;

    assert_error(&response, StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR");
}

#[tokio::test]
async fn test_upload_over_limit() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app_with_limit(RecordingForecaster::default(), 16)).unwrap();

    let response = server.post("/api/v1/uploads").text(THREE_DAY_CSV).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/api/v1/forecast"].is_object());
}

#[tokio::test]
async fn test_prometheus_metrics_endpoint() {
    let _guard = init_test_tracing();
    let server = TestServer::new(setup_test_app(RecordingForecaster::default())).unwrap();

    // metrics are not installed in test builds
    let response = server.get("/metrics").await;

    response.assert_status(StatusCode::NOT_FOUND);
}
