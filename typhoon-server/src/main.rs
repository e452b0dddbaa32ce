use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use typhoon_server::{AppState, Config, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();
    let state = Arc::new(AppState::from_config(&config));
    start_server(&config, state).await?;
    Ok(())
}
