use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;

use super::migrations::run_migrations;
use crate::core::config;
use crate::core::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool
///
/// Initializes a connection pool and runs the embedded schema migrations on
/// the first connection. Every pooled connection gets a busy timeout and WAL
/// journaling so concurrent handlers do not fail with `SQLITE_BUSY`.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use pinoy_gate::storage::create_pool;
///
/// let pool = create_pool("pinoy_gate.sqlite")?;
/// # Ok::<(), pinoy_gate::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.busy_timeout(config::database::busy_timeout())?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
    });
    let pool = Pool::builder()
        .max_size(config::database::POOL_MAX_SIZE)
        .build(manager)?;

    // Ensure schema is up to date before any handler touches the database
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    log::info!("Database pool ready at {}", database_path);
    Ok(pool)
}

/// Create a single-connection in-memory pool with the schema applied.
///
/// An in-memory SQLite database lives as long as its connection, so the pool
/// is capped at one connection that r2d2 keeps alive.
#[doc(hidden)]
pub fn create_memory_pool() -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager)?;

    let mut conn = pool.get()?;
    super::migrations::run_migrations_for_test(&mut conn)?;
    drop(conn);

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is automatically returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_exists(conn: &rusqlite::Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count > 0)
        .unwrap_or(false)
    }

    #[test]
    fn test_create_pool_applies_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.sqlite");
        let pool = create_pool(path.to_str().unwrap()).unwrap();

        let conn = get_connection(&pool).unwrap();
        assert!(table_exists(&conn, "verified_users"));
        assert!(table_exists(&conn, "banned_users"));
        assert!(table_exists(&conn, "join_requests"));
    }

    #[test]
    fn test_create_pool_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.sqlite");
        let path = path.to_str().unwrap();

        drop(create_pool(path).unwrap());
        assert!(create_pool(path).is_ok());
    }

    #[test]
    fn test_memory_pool_keeps_data_between_checkouts() {
        let pool = create_memory_pool().unwrap();
        {
            let conn = get_connection(&pool).unwrap();
            conn.execute(
                "INSERT INTO verified_users (user_id, phone_number) VALUES (1, '+639171234567')",
                [],
            )
            .unwrap();
        }
        let conn = get_connection(&pool).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM verified_users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
