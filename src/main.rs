use std::process::ExitCode;

use photo_clients::{logging, AppConfig, AppPaths, ClientCatalog, Result};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Startup failed");
            eprintln!("photo-clients: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    logging::init_logging("info");

    let paths = AppPaths::from_env()?;
    let config = AppConfig::load(&paths.config_path);
    let catalog = ClientCatalog::open(&paths)?;

    // The launch backup is a convenience; a failure must not block startup
    if config.auto_backup {
        if let Err(e) = catalog.library().backup_to(&config.backup_dir(&paths)) {
            warn!(error = %e, "Launch backup failed");
        }
    }

    let stats = catalog.get_stats()?;
    info!(
        clients = stats.total_clients,
        types = stats.type_distribution.len(),
        nas_path = %config.nas_path,
        "Catalog ready"
    );

    for client in catalog.find_missing_folders()? {
        warn!(id = client.id, name = %client.name, folder = %client.folder_path, "Client folder missing");
    }

    Ok(())
}
