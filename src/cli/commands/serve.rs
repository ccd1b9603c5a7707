use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace};

use crate::config::{initialize_app_state, Settings};
use crate::router::create_router;

pub async fn serve(settings: Settings) -> Result<()> {
    trace!("Entering serve function");
    info!("Salescast application starting up");
    debug!("Bind address: {}", settings.bind_address);
    debug!("Maximum upload size: {} bytes", settings.max_upload_bytes);

    let bind_address = settings.bind_address.clone();

    // Initialize application state
    trace!("Initializing application state");
    let state = initialize_app_state(settings);
    debug!("Application state initialized successfully");

    // Create router
    trace!("Creating application router");
    let app = create_router(state);
    debug!("Router created successfully");

    // Start server
    info!("Starting server on {}", bind_address);
    trace!("Attempting to bind TCP listener to {}", bind_address);
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("Salescast API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);
    debug!("Server is ready to accept connections");

    trace!("Starting axum server");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}
