use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

/// Connects to a fresh in-memory SQLite database with the schema applied.
///
/// The pool is pinned to a single connection: every pooled connection to
/// `sqlite::memory:` would otherwise open its own private database.
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Connects to a file-backed SQLite database inside a fresh temp directory.
///
/// Used by tests that need real concurrent writers (the in-memory setup is
/// single-connection). The caller must keep the returned `TempDir` alive for
/// the duration of the test.
#[cfg(test)]
pub async fn setup_file_test_db() -> (DatabaseConnection, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to file-backed test db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    (db, dir)
}
