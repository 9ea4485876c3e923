use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;

const MAX_CONNECTIONS: u32 = 5;

/// Open a pool for a `sqlite:<path>[?options]` URL. A bare path works too.
pub fn create_pool(database_url: &str) -> Result<DbPool, r2d2::Error> {
    let manager = match database_path(database_url) {
        ":memory:" => SqliteConnectionManager::memory(),
        path => SqliteConnectionManager::file(Path::new(path)),
    };

    Pool::builder()
        .max_size(MAX_CONNECTIONS)
        .build(manager.with_init(init_connection))
}

/// Single-connection in-memory pool; every extra connection would see its
/// own empty database.
pub fn create_memory_pool() -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::memory().with_init(init_connection);
    Pool::builder().max_size(1).build(manager)
}

fn database_path(database_url: &str) -> &str {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    // Query options such as ?mode=rwc are for other drivers
    path.split('?').next().unwrap_or(path)
}

// Foreign keys are a per-connection setting; cascading deletes depend on it.
fn init_connection(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path() {
        assert_eq!(database_path("sqlite:ralphie.db?mode=rwc"), "ralphie.db");
        assert_eq!(database_path("sqlite::memory:"), ":memory:");
        assert_eq!(database_path("/var/lib/ralphie.db"), "/var/lib/ralphie.db");
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let pool = create_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
