//! Binary entrypoint for the inkgraph HTTP server.
//!
//! Configuration is read from `INKGRAPH_*` environment variables; see
//! [`inkgraph_server::config`].

use inkgraph_server::config::ServerConfig;
use inkgraph_server::router::build_router;
use inkgraph_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config)?;
    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!(
        "inkgraph server starting on {} (data root: {})",
        addr,
        config.root.display()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
