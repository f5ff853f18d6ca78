//! Stakehouse Server Binary
//!
//! Starts the casino settlement service over the configured store.

use clap::Parser;
use stakehouse::api::ApiServer;
use stakehouse::config::ConfigLoader;
use stakehouse::storage::Store;

#[derive(Parser, Debug)]
#[command(name = "stakehouse")]
#[command(about = "Stakehouse Casino Settlement Service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// API server host
    #[arg(long)]
    host: Option<String>,

    /// API server port
    #[arg(long)]
    port: Option<u16>,

    /// Database directory
    #[arg(long)]
    db_path: Option<String>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long)]
    cors_origins: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    // CLI flags override both the file and environment variables
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db_path) = args.db_path {
        config.storage.data_directory = db_path;
    }
    if let Some(origins) = args.cors_origins {
        config.server.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(timeout) = args.timeout {
        config.server.request_timeout_seconds = timeout;
    }
    config.validate()?;

    println!("📂 Opening store: {}", config.storage.data_directory);
    let store = Store::open(&config.storage.data_directory)?;
    println!("✅ Store opened successfully");

    let server = ApiServer::new(config, store);
    server.run().await?;

    Ok(())
}
