//! Database operations for verified and banned users.

use rusqlite::{params, Connection, OptionalExtension, Result};

/// A user who shared a Philippine phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUser {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    /// Normalized phone number (`+63…`)
    pub phone_number: String,
    pub verified_at: String,
    /// True when the user is listed in `banned_users`
    pub is_banned: bool,
}

/// Identity of the Telegram user being verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<VerifiedUser> {
    Ok(VerifiedUser {
        user_id: row.get(0)?,
        username: row.get(1)?,
        first_name: row.get(2)?,
        phone_number: row.get(3)?,
        verified_at: row.get(4)?,
        is_banned: row.get::<_, i64>(5)? != 0,
    })
}

const SELECT_USER: &str = "SELECT v.user_id, v.username, v.first_name, v.phone_number, v.verified_at,
            EXISTS(SELECT 1 FROM banned_users b WHERE b.user_id = v.user_id)
     FROM verified_users v";

/// Insert or replace a verified user. The phone number is stored as given;
/// callers pass the normalized form.
pub fn upsert_verified_user(conn: &Connection, profile: &UserProfile, phone_number: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO verified_users (user_id, username, first_name, phone_number, verified_at)
         VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
         ON CONFLICT(user_id) DO UPDATE SET
           username = ?2,
           first_name = ?3,
           phone_number = ?4,
           verified_at = CURRENT_TIMESTAMP",
        params![profile.user_id, profile.username, profile.first_name, phone_number],
    )?;
    Ok(())
}

/// Fetch a verified user regardless of ban status.
pub fn get_verified_user(conn: &Connection, user_id: i64) -> Result<Option<VerifiedUser>> {
    conn.query_row(
        &format!("{} WHERE v.user_id = ?1", SELECT_USER),
        params![user_id],
        parse_row,
    )
    .optional()
}

/// Ban a user. Returns false if the user was already banned.
pub fn ban_user(conn: &Connection, user_id: i64, banned_by: Option<i64>) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO banned_users (user_id, banned_by) VALUES (?1, ?2)",
        params![user_id, banned_by],
    )?;
    Ok(affected > 0)
}

/// Lift a ban. Returns false if the user was not banned.
pub fn unban_user(conn: &Connection, user_id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM banned_users WHERE user_id = ?1", params![user_id])?;
    Ok(affected > 0)
}

pub fn is_banned(conn: &Connection, user_id: i64) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM banned_users WHERE user_id = ?1)",
        params![user_id],
        |row| row.get::<_, i64>(0),
    )
    .map(|exists| exists != 0)
}

/// Number of verified (not banned) users and number of bans.
pub fn count_users(conn: &Connection) -> Result<(i64, i64)> {
    let verified: i64 = conn.query_row(
        "SELECT COUNT(*) FROM verified_users v
         WHERE NOT EXISTS(SELECT 1 FROM banned_users b WHERE b.user_id = v.user_id)",
        [],
        |row| row.get(0),
    )?;
    let banned: i64 = conn.query_row("SELECT COUNT(*) FROM banned_users", [], |row| row.get(0))?;
    Ok((verified, banned))
}
