//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, database bootstrap and file import/export.
//! - Keep output deterministic for quick local sanity checks.

use roster_core::{
    init_logging, AppConfig, DatabaseManager, FileFormat, PersonalService,
};
use std::process::ExitCode;

const CONFIG_ENV: &str = "ROSTER_CONFIG";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("roster: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut config = match std::env::var(CONFIG_ENV) {
        Ok(path) => AppConfig::load(&path).map_err(|err| err.to_string())?,
        Err(_) => AppConfig::default(),
    };
    config.apply_env_overrides();
    config.validate().map_err(|err| err.to_string())?;

    if let Some(log_dir) = &config.log_directory {
        init_logging(&config.log_level, log_dir).map_err(|err| err.to_string())?;
    }

    let mut database =
        DatabaseManager::new(config.database_config()).map_err(|err| err.to_string())?;
    let report = database.initialize().map_err(|err| err.to_string())?;
    for failure in &report.failures {
        log::warn!(
            "event=cli_bootstrap module=cli status=error step={:?} error={}",
            failure.step,
            failure.message
        );
    }
    println!(
        "database bootstrap: applied={} failed={}",
        report.applied.len(),
        report.failures.len()
    );

    let format = match std::env::args().nth(1) {
        Some(value) => value.parse::<FileFormat>()?,
        None => FileFormat::Json,
    };

    let service = PersonalService::from_config(&config).map_err(|err| err.to_string())?;
    let loaded = service
        .import_default(&config.data_directory, format)
        .map_err(|err| err.to_string())?;
    println!("imported {loaded} records from {format}");

    let written = service
        .export_enabled(&config.data_directory, &config.output_formats)
        .map_err(|err| err.to_string())?;
    for path in written {
        println!("exported {}", path.display());
    }
    Ok(())
}
