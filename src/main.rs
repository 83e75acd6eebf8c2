use std::sync::Arc;
use std::time::Duration;
use switchboard::config::Config;
use switchboard::domain::flow::FlowRegistry;
use switchboard::infrastructure::session::SessionManager;
use switchboard::interface::api::{build_router, init_metrics, update_active_sessions, AppState};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting Switchboard IVR host");

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded: {:?}", config);

    // Register call flows
    let registry = Arc::new(FlowRegistry::with_defaults());
    info!("Registered call flows: {:?}", registry.names());

    // Create the session cache
    let sessions = Arc::new(SessionManager::new(
        config.workflow.max_sessions,
        Duration::from_secs(config.workflow.session_idle_secs),
    ));

    // Initialize metrics exporter
    info!("Initializing Prometheus metrics exporter");
    let prometheus_handle = init_metrics();

    // Start session gauge updater task
    {
        let sessions = sessions.clone();
        tokio::spawn(async move {
            loop {
                let count = sessions.count().await;
                update_active_sessions(count as usize);

                // Update every 5 seconds
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        });
        info!("Session gauge updater task started");
    }

    // Start the webhook server
    let state = AppState { registry, sessions };
    let app = build_router(state, prometheus_handle);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Voice webhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
