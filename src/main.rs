use dotenvy::dotenv;
use log::info;

use stockroom::{config::Config, create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    // Build the application router
    let app = create_router(AppState::new(config));

    info!("📦 Stockroom starting on http://{}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
