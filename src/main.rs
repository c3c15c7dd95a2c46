use attendance_desk::{router, AppState, Config};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    info!(
        backend = %config.api_base_url,
        session = %config.session_path.display(),
        check_in_debounce_ms = config.check_in_debounce.as_millis() as u64,
        check_out_debounce_ms = config.check_out_debounce.as_millis() as u64,
        "starting attendance desk"
    );

    let state = AppState::new(&config);
    if let Err(err) = state.desk.refresh().await {
        warn!("initial attendance fetch failed, serving without data: {err}");
    }

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
