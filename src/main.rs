use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::info;

use vibelens_backend::config::CONFIG;
use vibelens_backend::router;
use vibelens_backend::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _logging_guards = init_logging();
    CONFIG.log_startup_summary();

    let app = router();
    let addr: SocketAddr = format!("{}:{}", CONFIG.host, CONFIG.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install ctrl-c handler: {err}");
        return;
    }
    info!("Shutdown signal received");
}
