use crate::handlers::{
    forecast::{render_forecast_chart, run_forecast, upload_dataset},
    health::health_check,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.settings.max_upload_bytes;

    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Upload and forecast routes
        .route("/api/v1/uploads", post(upload_dataset))
        .route("/api/v1/forecast", post(run_forecast))
        .route("/api/v1/forecast/chart", post(render_forecast_chart))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // The metrics recorder is global, so tests run without it
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
