//! inventack-authz REST API server
//!
//! Run with: cargo run --features server --bin inventack-authz-server
//!
//! Environment:
//!   INVENTACK_AUTHZ_DB        - LMDB directory (default ./data/authz.mdb)
//!   INVENTACK_AUTHZ_MAP_SIZE  - LMDB map size in bytes
//!   PORT                      - Listen port (default 3000)
//!   RUST_LOG                  - Log filter (default info)

use std::net::SocketAddr;

use socket2::{Domain, Socket, Type};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inventack_authz::{init_with_map_size, server, Settings};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Listener
// ============================================================================

fn bind(addr: &str) -> Result<tokio::net::TcpListener, BoxError> {
    let addr: SocketAddr = addr.parse()?;
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

// ============================================================================
// Main
// ============================================================================

async fn run(settings: Settings) -> Result<(), BoxError> {
    info!(path = %settings.db_path, "initializing membership store");
    init_with_map_size(&settings.db_path, settings.map_size)?;

    let addr = settings.bind_addr();
    let listener = bind(&addr)?;
    info!(%addr, "inventack-authz server running");

    axum::serve(listener, server::router()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    if let Err(e) = run(settings).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
