use std::path::{Path, PathBuf};

use silvr::config::Config;
use silvr::db::init_db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);
    let init = args.iter().any(|arg| arg == "--init-db");

    // Load configuration
    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    // Initialize logging (warnings and errors by default, more in debug mode)
    let default_level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // If --init-db, recreate the tables and exit
    if init {
        init_db(&config.db_path, config.schema_path.as_deref().map(Path::new)).await?;
        println!("Initialized database at {}", config.db_path);
        return Ok(());
    }

    silvr::serve(config).await
}
