use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};

use crate::core::config;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    // Serialize migrations per-process so pooled connections opened in
    // parallel never race on the schema history table.
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    // Migrations are idempotent, so a poisoned lock is safe to recover.
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(config::database::busy_timeout())
        .context("set SQLite busy timeout")?;

    // refinery wraps every migration in its own transaction, so no outer
    // BEGIN here; the busy timeout covers other processes.
    let report = embedded::migrations::runner()
        .run(conn)
        .context("apply migrations")?;

    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}

/// Run migrations for tests without taking the process-wide lock
/// Each in-memory connection has its own schema, so there is nothing to race on
#[doc(hidden)]
pub fn run_migrations_for_test(conn: &mut Connection) -> Result<()> {
    conn.busy_timeout(config::database::busy_timeout())
        .context("set SQLite busy timeout")?;

    embedded::migrations::runner()
        .run(conn)
        .map(|_| ())
        .context("apply migrations")
}

/// Opens an in-memory database with the full schema applied.
#[doc(hidden)]
pub fn open_test_connection() -> Result<Connection> {
    let mut conn = Connection::open_in_memory().context("open in-memory database")?;
    run_migrations_for_test(&mut conn)?;
    Ok(conn)
}
