use std::process::ExitCode;

use tracing::{error, info};

use filehub::file::FileStore;
use filehub::web::WebServer;
use filehub::{Config, Database, OwnerRepository};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = filehub::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filehub::logging::init_console_only(&config.logging.level);
    }

    info!("filehub starting");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("filehub stopped: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> filehub::Result<()> {
    let db = Database::open(&config.database.path).await?;
    let owners = OwnerRepository::new(db.pool()).count().await?;
    info!(path = %config.database.path, owners, "Database opened");

    FileStore::new(&config.files.storage_path).ensure_root()?;

    let server = WebServer::new(&config, db)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    server.run().await?;
    Ok(())
}
