//! textscore-server/src/server.rs
//!
//! Binds the HTTP listener and runs it until Ctrl-C.

use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use tracing::{error, info};

use textscore_core::http::build_router;
use textscore_core::Error;

use crate::context::ServerContext;
use crate::Args;

/// In-flight requests get this long to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub async fn run_server(args: &Args, migrate: bool) -> Result<(), Error> {
    let addr: SocketAddr = args.bind_addr.parse()?;

    let ctx = ServerContext::new(args, migrate).await?;
    let app = build_router(ctx.state.clone(), &args.cors_origin)?;

    let handle = Handle::new();
    let handle_clone = handle.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received; shutting down.");
                handle_clone.graceful_shutdown(Some(SHUTDOWN_GRACE));
            }
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    info!("Text analysis API listening on http://{}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    ctx.db.close().await;
    info!("Server shutdown complete.");
    Ok(())
}
