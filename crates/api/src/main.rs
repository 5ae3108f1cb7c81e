use anyhow::Result;
use domain::services::SubmissionService;
use tracing::info;

use rsvp_api::{app, config, middleware, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting RSVP service v{}", env!("CARGO_PKG_VERSION"));

    let sink = services::build_sink(&config.sheets)?;
    let submissions = SubmissionService::new(sink);

    let addr = config.socket_addr()?;
    let app = app::create_app(config, submissions);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
