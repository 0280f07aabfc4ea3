//! Wayfare room chat and expense ledger server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin wayfare-server
//! cargo run --bin wayfare-server -- --host 0.0.0.0 --port 3000 --users-file users.json
//! ```

use std::sync::Arc;

use clap::Parser;
use wayfare_server::{
    config::{Args, DirectorySource, ServerConfig},
    domain::UserDirectory,
    infrastructure::user_directory::{HttpUserDirectory, InMemoryUserDirectory},
    ui::{AppState, Server},
};
use wayfare_shared::{logger::setup_logger, time::SystemClock};

fn build_user_directory(
    source: &DirectorySource,
) -> Result<Arc<dyn UserDirectory>, Box<dyn std::error::Error>> {
    let directory: Arc<dyn UserDirectory> = match source {
        DirectorySource::Empty => {
            tracing::warn!("No user directory configured; every sender shows as unknown");
            Arc::new(InMemoryUserDirectory::new())
        }
        DirectorySource::File(path) => {
            let directory = InMemoryUserDirectory::from_json_file(path)?;
            tracing::info!(
                "Loaded {} user profile(s) from {}",
                directory.len(),
                path.display()
            );
            Arc::new(directory)
        }
        DirectorySource::Http(base_url) => {
            tracing::info!("Resolving users from {}", base_url);
            Arc::new(HttpUserDirectory::new(base_url.clone())?)
        }
    };
    Ok(directory)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let config = ServerConfig::from(Args::parse());

    // Initialize dependencies in order:
    // 1. UserDirectory
    // 2. Repositories, MessagePusher and UseCases (AppState)
    // 3. Server
    let user_directory = match build_user_directory(&config.directory) {
        Ok(directory) => directory,
        Err(e) => {
            tracing::error!("Failed to set up user directory: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState::in_memory(&config, user_directory, Arc::new(SystemClock));

    let server = Server::new(state, config.typing_sweep_interval);
    if let Err(e) = server.run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
