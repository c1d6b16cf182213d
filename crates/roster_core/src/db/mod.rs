//! SQLite lifecycle management for schema and seed bootstrap.
//!
//! # Responsibility
//! - Own the single relational connection and its open/close transitions.
//! - Run externally supplied schema/seed scripts at startup.
//! - Offer a scoped "borrow connection, always close" entry point.
//!
//! # Invariants
//! - Scripts only run while connected.
//! - The connection is never exposed outside a scoped borrow.
//! - No personnel data is read or written through this module.

use std::path::PathBuf;

mod manager;
mod script;

pub use manager::{
    BootstrapFailure, BootstrapPolicy, BootstrapReport, BootstrapStep, ConnectionState,
    DatabaseConfig, DatabaseManager, DbLocation,
};
pub use script::ScriptSource;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid database url `{0}`")]
    InvalidUrl(String),

    /// Operation attempted in the wrong connection state.
    #[error("cannot {operation} while the database is disconnected")]
    IllegalLifecycleState { operation: &'static str },

    #[error("script `{name}` is unavailable: {reason}")]
    ScriptUnavailable { name: String, reason: String },

    #[error("script `{name}` failed: {source}")]
    Script {
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("cannot prepare database path `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
