use std::path::PathBuf;
use std::sync::Arc;

use crossedge::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};
use crossedge::adapter::outbound::sqlite::SqliteStore;
use tempfile::TempDir;

/// Migrated SQLite database in a temporary directory.
///
/// The directory and the database file are removed on drop.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(format!("crossedge-{name}.db"));

        let url = format!("sqlite://{}", path.display());
        let pool = create_pool(&url).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::new(SqliteStore::new(self.pool.clone()))
    }
}
