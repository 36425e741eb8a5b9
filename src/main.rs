mod app_state;
mod config;
mod gateway;
mod models;
mod routes;
pub mod external;
pub use app_state::AppState;
pub use config::Config;
use external::External;
use gateway::TickerGateway;

use crate::routes::make_app;
use dotenv::dotenv;
use std::{error::Error, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let dotenv_loaded = dotenv().is_ok();
    let config = Config::init()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();
    if !dotenv_loaded {
        info!("Starting server without .env file.");
    }

    let external = External::new(&config)?;
    let gateway = TickerGateway::new(Arc::new(external), config.upstream_timeout);
    let bind_addr = config.bind_addr.clone();
    let app = make_app(Arc::new(AppState { gateway, config }))?;

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "🚀 Server started successfully");
    axum::serve(listener, app).await?;
    Ok(())
}
