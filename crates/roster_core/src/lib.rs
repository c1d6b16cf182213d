//! Persistence core for team personnel records.
//! This crate is the single source of truth for record invariants, file
//! formats and database bootstrap.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use cache::PersonalCache;
pub use config::{AppConfig, ConfigError};
pub use db::{
    BootstrapPolicy, BootstrapReport, ConnectionState, DatabaseConfig, DatabaseManager, DbError,
    DbResult, ScriptSource,
};
pub use error::{PersonalError, PersonalResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::personal::{
    Personal, PersonalId, PersonalInfo, PersonalKind, PersonalTag, PlayerStats, Position,
    Specialization, ValidationError, UNASSIGNED_ID,
};
pub use service::personal_service::PersonalService;
pub use storage::{
    storage_for, CsvStorage, FileFormat, JsonStorage, PersonalStorage, XmlStorage,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
