//! Connection lifecycle and startup bootstrap.
//!
//! # Responsibility
//! - Track the Disconnected/Connected state of one SQLite connection.
//! - Apply schema and seed scripts according to `DatabaseConfig`.
//! - Guarantee close after every scoped borrow, including failures.
//!
//! # Invariants
//! - `connect` is idempotent.
//! - `initialize` and `with_connection` always leave the manager disconnected.
//! - Callers needing concurrent access wrap the manager in a mutex; it takes
//!   `&mut self` for every transition.

use super::script::ScriptSource;
use super::{DbError, DbResult};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the database lives, parsed from the configured URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// Private in-memory database; its content is lost on close.
    Memory,
    File(PathBuf),
}

impl DbLocation {
    /// Accepts `sqlite::memory:`, `:memory:`, `sqlite:<path>`,
    /// `sqlite://<path>` and bare paths. A leading `jdbc:` is ignored.
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        let without_jdbc = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);
        let target = without_jdbc
            .strip_prefix("sqlite://")
            .or_else(|| without_jdbc.strip_prefix("sqlite:"))
            .unwrap_or(without_jdbc);

        match target {
            "" => Err(DbError::InvalidUrl(url.to_string())),
            ":memory:" => Ok(Self::Memory),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// How script failures during `initialize` are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPolicy {
    /// Log the failure, record it in the report and run the remaining steps.
    #[default]
    LogAndContinue,
    /// Close and return the first failure.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    Schema,
    Data,
}

impl BootstrapStep {
    fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Data => "data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapFailure {
    pub step: BootstrapStep,
    pub message: String,
}

/// Outcome of `DatabaseManager::initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub applied: Vec<BootstrapStep>,
    pub failures: Vec<BootstrapFailure>,
}

impl BootstrapReport {
    pub fn schema_applied(&self) -> bool {
        self.applied.contains(&BootstrapStep::Schema)
    }

    pub fn data_applied(&self) -> bool {
        self.applied.contains(&BootstrapStep::Data)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Settings for `DatabaseManager`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub init_tables: bool,
    pub init_data: bool,
    pub schema_script: ScriptSource,
    pub data_script: ScriptSource,
    pub bootstrap_policy: BootstrapPolicy,
}

impl DatabaseConfig {
    /// Both bootstrap steps enabled with the bundled scripts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            init_tables: true,
            init_data: true,
            schema_script: ScriptSource::default_schema(),
            data_script: ScriptSource::default_data(),
            bootstrap_policy: BootstrapPolicy::default(),
        }
    }
}

/// Owner of the single database connection.
pub struct DatabaseManager {
    config: DatabaseConfig,
    location: DbLocation,
    conn: Option<Connection>,
}

impl DatabaseManager {
    /// Creates a disconnected manager.
    ///
    /// # Errors
    /// - `InvalidUrl` when `config.url` is empty.
    pub fn new(config: DatabaseConfig) -> DbResult<Self> {
        let location = DbLocation::parse(&config.url)?;
        Ok(Self {
            config,
            location,
            conn: None,
        })
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn state(&self) -> ConnectionState {
        if self.conn.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Opens the connection; a no-op when already connected.
    pub fn connect(&mut self) -> DbResult<()> {
        if self.conn.is_some() {
            debug!("event=db_connect module=db status=skipped reason=already_connected");
            return Ok(());
        }

        let started_at = Instant::now();
        let mode = self.location.mode();
        info!("event=db_connect module=db status=start mode={mode}");

        match open_connection(&self.location) {
            Ok(conn) => {
                self.conn = Some(conn);
                info!(
                    "event=db_connect module=db status=ok mode={} duration_ms={}",
                    mode,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=db_connect module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Closes the connection; a no-op when already disconnected.
    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match conn.close() {
            Ok(()) => info!("event=db_close module=db status=ok"),
            // The handle is dropped either way, which finalizes it.
            Err((_conn, err)) => warn!(
                "event=db_close module=db status=error error_code=db_close_failed error={err}"
            ),
        }
    }

    /// Borrows the open connection.
    ///
    /// # Errors
    /// - `IllegalLifecycleState` while disconnected.
    pub fn connection(&self) -> DbResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(DbError::IllegalLifecycleState {
                operation: "borrow the connection",
            })
    }

    /// Executes `script` as a batch on the open connection.
    ///
    /// # Errors
    /// - `IllegalLifecycleState` while disconnected.
    /// - `ScriptUnavailable` when the script cannot be read.
    /// - `Script` when SQLite rejects it.
    pub fn run_script(&self, script: &ScriptSource) -> DbResult<()> {
        let conn = self.conn.as_ref().ok_or(DbError::IllegalLifecycleState {
            operation: "run a script",
        })?;

        let started_at = Instant::now();
        let sql = script.load()?;
        conn.execute_batch(&sql).map_err(|source| DbError::Script {
            name: script.name().to_string(),
            source,
        })?;

        debug!(
            "event=db_script module=db status=ok script={} duration_ms={}",
            script.name(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Startup sequence: connect, optional schema, optional seed, close.
    ///
    /// Script failures follow `bootstrap_policy`. A failure to connect is
    /// always returned.
    pub fn initialize(&mut self) -> DbResult<BootstrapReport> {
        let started_at = Instant::now();
        info!(
            "event=db_bootstrap module=db status=start init_tables={} init_data={}",
            self.config.init_tables, self.config.init_data
        );

        self.connect()?;

        let mut report = BootstrapReport::default();
        let steps = [
            (BootstrapStep::Schema, self.config.init_tables),
            (BootstrapStep::Data, self.config.init_data),
        ];
        for (step, enabled) in steps {
            if !enabled {
                continue;
            }
            let script = match step {
                BootstrapStep::Schema => &self.config.schema_script,
                BootstrapStep::Data => &self.config.data_script,
            };

            match self.run_script(script) {
                Ok(()) => report.applied.push(step),
                Err(err) => {
                    error!(
                        "event=db_bootstrap module=db status=error step={} error={}",
                        step.as_str(),
                        err
                    );
                    if self.config.bootstrap_policy == BootstrapPolicy::FailFast {
                        self.close();
                        return Err(err);
                    }
                    report.failures.push(BootstrapFailure {
                        step,
                        message: err.to_string(),
                    });
                }
            }
        }

        self.close();
        info!(
            "event=db_bootstrap module=db status=ok applied={} failed={} duration_ms={}",
            report.applied.len(),
            report.failures.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Scoped borrow: connects if needed, runs `work`, then closes.
    ///
    /// The close also happens when `work` fails or panics; its error is
    /// returned after cleanup.
    pub fn with_connection<T, F>(&mut self, work: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        self.connect()?;
        let guard = CloseOnDrop { manager: self };
        let conn = guard.manager.connection()?;
        let result = work(conn);
        drop(guard);
        result
    }
}

struct CloseOnDrop<'a> {
    manager: &'a mut DatabaseManager,
}

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.manager.close();
    }
}

fn open_connection(location: &DbLocation) -> DbResult<Connection> {
    let conn = match location {
        DbLocation::Memory => Connection::open_in_memory()?,
        DbLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
            Connection::open(path)?
        }
    };
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}
