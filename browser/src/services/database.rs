//! Locates per-resource databases and builds missing ones on demand.

use dashmap::DashMap;
use ontobrowse_config::BrowserConfig;
use ontobrowse_models::Resource;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::errors::{BrowserError, BrowserResult};

#[derive(Clone)]
pub struct DatabaseLocator {
    build_dir: PathBuf,
    project_dir: PathBuf,
    build_command: String,
    build_timeout: Duration,
    // One lock per database name so concurrent requests don't build twice
    build_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl DatabaseLocator {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            build_dir: config.build_dir.clone(),
            project_dir: config.project_dir.clone(),
            build_command: config.build_command.clone(),
            build_timeout: config.build_timeout,
            build_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn database_path(&self, resource: &Resource) -> PathBuf {
        self.build_dir.join(format!("{}.db", resource.database_name()))
    }

    /// Returns the database path for `resource`, building the file first if it is absent.
    pub async fn resolve(&self, resource: &Resource) -> BrowserResult<PathBuf> {
        let path = self.database_path(resource);

        if !exists(&self.build_dir).await {
            tokio::fs::create_dir_all(&self.build_dir).await?;
        }
        if exists(&path).await {
            return Ok(path);
        }

        let lock = self
            .build_locks
            .entry(resource.database_name())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        // Another request may have finished the build while we waited
        if exists(&path).await {
            return Ok(path);
        }

        self.build(resource, &path).await?;

        if !exists(&path).await {
            error!(resource = %resource.code, path = %path.display(), "Build finished without producing a database");
            return Err(build_failure(resource));
        }
        Ok(path)
    }

    /// Opens a read-only connection for the duration of one request.
    pub async fn open(&self, resource: &Resource) -> BrowserResult<SqliteConnection> {
        let path = self.resolve(resource).await?;
        let options = SqliteConnectOptions::new().filename(&path).read_only(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }

    async fn build(&self, resource: &Resource, path: &Path) -> BrowserResult<()> {
        let target = self.build_target(path);
        info!(
            resource = %resource.code,
            command = %self.build_command,
            target = %target.display(),
            "Building database"
        );

        let start = Instant::now();
        let child = Command::new(&self.build_command)
            .arg(&target)
            .current_dir(&self.project_dir)
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(self.build_timeout, child).await {
            Ok(Ok(status)) if status.success() => {
                info!(
                    resource = %resource.code,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Database built"
                );
                Ok(())
            }
            Ok(Ok(status)) => {
                error!(resource = %resource.code, status = %status, "Database build failed");
                Err(build_failure(resource))
            }
            Ok(Err(e)) => {
                error!(resource = %resource.code, error = %e, "Unable to start database build");
                Err(build_failure(resource))
            }
            Err(_) => {
                error!(
                    resource = %resource.code,
                    timeout_secs = self.build_timeout.as_secs(),
                    "Database build timed out"
                );
                Err(build_failure(resource))
            }
        }
    }

    /// The build target relative to the project directory, e.g. `build/ontie.db`.
    fn build_target(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.project_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn build_failure(resource: &Resource) -> BrowserError {
    BrowserError::BuildFailed(format!("Unable to create database for {}", resource.code))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locator(root: &TempDir, command: &str, timeout: Duration) -> DatabaseLocator {
        let config = BrowserConfig {
            build_dir: root.path().join("build"),
            project_dir: root.path().to_path_buf(),
            build_command: command.to_string(),
            build_timeout: timeout,
            ..BrowserConfig::default()
        };
        DatabaseLocator::new(&config)
    }

    #[test]
    fn test_paths_use_lowercased_code() {
        let root = TempDir::new().unwrap();
        let locator = locator(&root, "true", Duration::from_secs(5));
        let resource = Resource::new("ONTIE", "Ontology for Immune Epitopes");

        let path = locator.database_path(&resource);
        assert_eq!(path, root.path().join("build").join("ontie.db"));
        assert_eq!(locator.build_target(&path), PathBuf::from("build/ontie.db"));
    }

    #[tokio::test]
    async fn test_existing_database_is_returned_without_building() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("build")).unwrap();
        std::fs::write(root.path().join("build/doid.db"), b"").unwrap();

        let locator = locator(&root, "false", Duration::from_secs(5));
        let path = locator.resolve(&Resource::new("DOID", "Disease")).await.unwrap();
        assert!(path.ends_with("doid.db"));
    }

    #[tokio::test]
    async fn test_creates_build_directory() {
        let root = TempDir::new().unwrap();
        let locator = locator(&root, "touch", Duration::from_secs(5));

        locator.resolve(&Resource::new("OBI", "OBI")).await.unwrap();
        assert!(root.path().join("build").is_dir());
        assert!(root.path().join("build/obi.db").is_file());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_a_build_failure() {
        let root = TempDir::new().unwrap();
        let locator = locator(&root, "false", Duration::from_secs(5));

        let err = locator.resolve(&Resource::new("OBI", "OBI")).await.unwrap_err();
        assert!(matches!(err, BrowserError::BuildFailed(ref msg) if msg == "Unable to create database for OBI"));
    }

    #[tokio::test]
    async fn test_missing_command_is_a_build_failure() {
        let root = TempDir::new().unwrap();
        let locator = locator(&root, "no-such-build-tool-xyz", Duration::from_secs(5));

        let err = locator.resolve(&Resource::new("OBI", "OBI")).await.unwrap_err();
        assert!(matches!(err, BrowserError::BuildFailed(_)));
    }

    #[tokio::test]
    async fn test_successful_exit_without_file_is_a_failure() {
        let root = TempDir::new().unwrap();
        let locator = locator(&root, "true", Duration::from_secs(5));

        let err = locator.resolve(&Resource::new("OBI", "OBI")).await.unwrap_err();
        assert!(matches!(err, BrowserError::BuildFailed(_)));
    }

    #[cfg(unix)]
    fn script(root: &TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = root.path().join("build.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_build_timeout_is_a_failure() {
        let root = TempDir::new().unwrap();
        let command = script(&root, "sleep 5\ntouch \"$1\"");
        let locator = locator(&root, &command, Duration::from_millis(200));

        let err = locator.resolve(&Resource::new("OBI", "OBI")).await.unwrap_err();
        assert!(matches!(err, BrowserError::BuildFailed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_concurrent_requests_build_once() {
        let root = TempDir::new().unwrap();
        let command = script(&root, "echo run >> runs.log\nsleep 0.3\ntouch \"$1\"");
        let locator = locator(&root, &command, Duration::from_secs(10));
        let resource = Resource::new("ONTIE", "ONTIE");

        let (a, b) = tokio::join!(locator.resolve(&resource), locator.resolve(&resource));
        assert!(a.is_ok());
        assert!(b.is_ok());

        let runs = std::fs::read_to_string(root.path().join("runs.log")).unwrap();
        assert_eq!(runs.lines().count(), 1);
    }
}
