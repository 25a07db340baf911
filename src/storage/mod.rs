//! Database, migrations, and the verification store

pub mod db;
pub mod join_requests;
pub mod migrations;
pub mod store;
pub mod verified;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use join_requests::{JoinRequestRecord, JoinRequestStatus};
pub use store::{MemoryStore, SqliteStore, StoreStats, VerificationStore};
pub use verified::{UserProfile, VerifiedUser};
