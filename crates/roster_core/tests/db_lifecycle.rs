use roster_core::{
    BootstrapPolicy, ConnectionState, DatabaseConfig, DatabaseManager, DbError, ScriptSource,
};
use rusqlite::Connection;
use std::path::Path;

fn file_config(path: &Path) -> DatabaseConfig {
    DatabaseConfig::new(format!("sqlite:{}", path.display()))
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table_name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

#[test]
fn schema_only_bootstrap_closes_and_scoped_borrow_reconnects() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(&dir.path().join("roster.db"));
    config.init_data = false;

    let mut manager = DatabaseManager::new(config).unwrap();
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let report = manager.initialize().unwrap();
    assert!(report.schema_applied());
    assert!(!report.data_applied());
    assert!(report.is_clean());
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let (has_table, rows) = manager
        .with_connection(|conn| {
            let rows: i64 = conn.query_row("SELECT COUNT(*) FROM personal;", [], |row| row.get(0))?;
            Ok((table_exists(conn, "personal"), rows))
        })
        .unwrap();
    assert!(has_table);
    assert_eq!(rows, 0);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[test]
fn full_bootstrap_seeds_data_and_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = DatabaseManager::new(file_config(&dir.path().join("roster.db"))).unwrap();

    assert!(manager.initialize().unwrap().is_clean());
    assert!(manager.initialize().unwrap().is_clean());

    let (personal, players) = manager
        .with_connection(|conn| {
            let personal: i64 =
                conn.query_row("SELECT COUNT(*) FROM personal;", [], |row| row.get(0))?;
            let players: i64 =
                conn.query_row("SELECT COUNT(*) FROM jugadores;", [], |row| row.get(0))?;
            Ok((personal, players))
        })
        .unwrap();
    assert_eq!(personal, 5);
    assert_eq!(players, 3);
}

#[test]
fn run_script_while_disconnected_is_illegal() {
    let manager = DatabaseManager::new(DatabaseConfig::new("sqlite::memory:")).unwrap();
    let err = manager
        .run_script(&ScriptSource::inline("probe.sql", "SELECT 1;"))
        .unwrap_err();
    assert!(matches!(err, DbError::IllegalLifecycleState { .. }));
    assert!(matches!(
        manager.connection(),
        Err(DbError::IllegalLifecycleState { .. })
    ));
}

#[test]
fn run_script_after_connect_succeeds() {
    let mut manager = DatabaseManager::new(DatabaseConfig::new(":memory:")).unwrap();
    manager.connect().unwrap();
    manager
        .run_script(&ScriptSource::inline(
            "probe.sql",
            "CREATE TABLE probe (id INTEGER PRIMARY KEY);",
        ))
        .unwrap();
    assert!(table_exists(manager.connection().unwrap(), "probe"));
    manager.close();
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[test]
fn failing_scripts_are_reported_and_bootstrap_continues() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(&dir.path().join("roster.db"));
    config.schema_script = ScriptSource::inline("broken.sql", "CREATE TABLOID nope;");
    config.data_script = ScriptSource::inline(
        "data.sql",
        "CREATE TABLE seeded (id INTEGER); INSERT INTO seeded VALUES (1);",
    );

    let mut manager = DatabaseManager::new(config).unwrap();
    let report = manager.initialize().unwrap();

    assert!(!report.schema_applied());
    assert!(report.data_applied());
    assert_eq!(report.failures.len(), 1);
    assert!(!manager.is_connected());

    let seeded = manager
        .with_connection(|conn| Ok(table_exists(conn, "seeded")))
        .unwrap();
    assert!(seeded);
}

#[test]
fn missing_script_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(&dir.path().join("roster.db"));
    config.schema_script = ScriptSource::file(dir.path().join("tablas.sql"));
    config.init_data = false;

    let mut manager = DatabaseManager::new(config).unwrap();
    let report = manager.initialize().unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].message.contains("tablas.sql"));
}

#[test]
fn fail_fast_policy_returns_first_error_and_closes() {
    let mut config = DatabaseConfig::new("sqlite::memory:");
    config.schema_script = ScriptSource::inline("broken.sql", "CREATE TABLOID nope;");
    config.bootstrap_policy = BootstrapPolicy::FailFast;

    let mut manager = DatabaseManager::new(config).unwrap();
    let err = manager.initialize().unwrap_err();
    assert!(matches!(err, DbError::Script { ref name, .. } if name == "broken.sql"));
    assert!(!manager.is_connected());
}

#[test]
fn scoped_borrow_closes_and_propagates_work_failure() {
    let mut manager = DatabaseManager::new(DatabaseConfig::new("sqlite::memory:")).unwrap();
    let err = manager
        .with_connection(|conn| {
            conn.execute_batch("SELECT * FROM does_not_exist;")?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, DbError::Sqlite(_)));
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[test]
fn scoped_borrow_closes_after_panic() {
    let mut manager = DatabaseManager::new(DatabaseConfig::new("sqlite::memory:")).unwrap();
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = manager.with_connection(|_conn| -> roster_core::DbResult<()> {
            panic!("work exploded");
        });
    }));

    assert!(outcome.is_err());
    assert!(!manager.is_connected());
}

#[test]
fn empty_url_is_rejected() {
    assert!(matches!(
        DatabaseManager::new(DatabaseConfig::new("")),
        Err(DbError::InvalidUrl(_))
    ));
}
