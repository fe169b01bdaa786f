use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::services::InventoryService;

/// Running HTTP server
///
/// Holds the server task handle and the bound address so callers (and
/// tests binding port 0) know where it is listening.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub local_addr: std::net::SocketAddr,
}

impl Application {
    /// Build the router from config and start serving
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let params = config.default_params();
        params.validate()?;

        let inventory_service = InventoryService::new(config.import_limits());
        info!(
            "Upload limits: {} rows, {} columns, {} bytes",
            config.max_upload_rows, config.max_upload_columns, config.max_upload_bytes
        );

        let app_state = AppState {
            inventory_service,
            default_params: params,
            max_upload_bytes: config.max_upload_bytes,
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Starting HTTP server on {}", local_addr);

        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            local_addr,
        })
    }

    /// Run until the server stops (which runs indefinitely unless error)
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
