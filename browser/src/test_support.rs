use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Executor};
use tempfile::TempDir;

pub const ONTIE_FIXTURE: &str = include_str!("../tests/fixtures/ontie.sql");

/// A writable connection to a fresh copy of the ONTIE fixture database.
pub async fn ontie_fixture() -> (TempDir, SqliteConnection) {
    let dir = TempDir::new().unwrap();
    let options = SqliteConnectOptions::new()
        .filename(dir.path().join("ontie.db"))
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    conn.execute(ONTIE_FIXTURE).await.unwrap();
    (dir, conn)
}
