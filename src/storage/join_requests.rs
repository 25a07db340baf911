//! Join-request ledger: one row per (user, chat) with its latest status.

use rusqlite::{params, Connection, Result};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a join request as seen by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Approved => "approved",
            JoinRequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinRequestStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JoinRequestStatus::Pending),
            "approved" => Ok(JoinRequestStatus::Approved),
            "rejected" => Ok(JoinRequestStatus::Rejected),
            other => Err(format!("unknown join request status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequestRecord {
    pub user_id: i64,
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub requested_at: String,
    pub status: JoinRequestStatus,
}

fn parse_row(row: &rusqlite::Row<'_>) -> Result<JoinRequestRecord> {
    let status: String = row.get(4)?;
    Ok(JoinRequestRecord {
        user_id: row.get(0)?,
        chat_id: row.get(1)?,
        chat_title: row.get(2)?,
        requested_at: row.get(3)?,
        // Unknown values can only come from manual edits; keep them visible as pending.
        status: status.parse().unwrap_or(JoinRequestStatus::Pending),
    })
}

/// Record (or re-open) a join request as pending.
pub fn record_join_request(conn: &Connection, user_id: i64, chat_id: i64, chat_title: Option<&str>) -> Result<()> {
    conn.execute(
        "INSERT INTO join_requests (user_id, chat_id, chat_title, requested_at, status, updated_at)
         VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP, 'pending', CURRENT_TIMESTAMP)
         ON CONFLICT(user_id, chat_id) DO UPDATE SET
           chat_title = COALESCE(?3, chat_title),
           requested_at = CURRENT_TIMESTAMP,
           status = 'pending',
           updated_at = CURRENT_TIMESTAMP",
        params![user_id, chat_id, chat_title],
    )?;
    Ok(())
}

/// Update the status of a single request. Returns false if it does not exist.
pub fn update_join_request_status(
    conn: &Connection,
    user_id: i64,
    chat_id: i64,
    status: JoinRequestStatus,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE join_requests SET status = ?3, updated_at = CURRENT_TIMESTAMP
         WHERE user_id = ?1 AND chat_id = ?2",
        params![user_id, chat_id, status.as_str()],
    )?;
    Ok(affected > 0)
}

/// All requests of a user still waiting for a phone number, oldest first.
pub fn pending_requests_for_user(conn: &Connection, user_id: i64) -> Result<Vec<JoinRequestRecord>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, chat_id, chat_title, requested_at, status
         FROM join_requests
         WHERE user_id = ?1 AND status = 'pending'
         ORDER BY requested_at, chat_id",
    )?;
    let rows = stmt.query_map(params![user_id], parse_row)?;
    rows.collect()
}

/// Request counts grouped by status: (pending, approved, rejected).
pub fn count_by_status(conn: &Connection) -> Result<(i64, i64, i64)> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM join_requests GROUP BY status")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

    let (mut pending, mut approved, mut rejected) = (0, 0, 0);
    for row in rows {
        let (status, count) = row?;
        match status.parse() {
            Ok(JoinRequestStatus::Pending) => pending += count,
            Ok(JoinRequestStatus::Approved) => approved += count,
            Ok(JoinRequestStatus::Rejected) => rejected += count,
            Err(e) => log::warn!("{}", e),
        }
    }
    Ok((pending, approved, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::open_test_connection;
    use rusqlite::OptionalExtension;

    const CHAT_A: i64 = -1001;
    const CHAT_B: i64 = -1002;

    fn get_join_request(conn: &Connection, user_id: i64, chat_id: i64) -> Result<Option<JoinRequestRecord>> {
        conn.query_row(
            "SELECT user_id, chat_id, chat_title, requested_at, status
             FROM join_requests WHERE user_id = ?1 AND chat_id = ?2",
            params![user_id, chat_id],
            parse_row,
        )
        .optional()
    }

    #[test]
    fn record_creates_pending_request() {
        let conn = open_test_connection().unwrap();
        record_join_request(&conn, 7, CHAT_A, Some("Pinoy Devs")).unwrap();

        let request = get_join_request(&conn, 7, CHAT_A).unwrap().expect("must exist");
        assert_eq!(request.status, JoinRequestStatus::Pending);
        assert_eq!(request.chat_title.as_deref(), Some("Pinoy Devs"));
    }

    #[test]
    fn record_reopens_resolved_request_and_keeps_title() {
        let conn = open_test_connection().unwrap();
        record_join_request(&conn, 7, CHAT_A, Some("Pinoy Devs")).unwrap();
        update_join_request_status(&conn, 7, CHAT_A, JoinRequestStatus::Rejected).unwrap();

        record_join_request(&conn, 7, CHAT_A, None).unwrap();
        let request = get_join_request(&conn, 7, CHAT_A).unwrap().unwrap();
        assert_eq!(request.status, JoinRequestStatus::Pending);
        assert_eq!(request.chat_title.as_deref(), Some("Pinoy Devs"));
    }

    #[test]
    fn update_missing_request_returns_false() {
        let conn = open_test_connection().unwrap();
        assert!(!update_join_request_status(&conn, 7, CHAT_A, JoinRequestStatus::Approved).unwrap());
    }

    #[test]
    fn pending_requests_only_lists_pending_rows_of_user() {
        let conn = open_test_connection().unwrap();
        record_join_request(&conn, 7, CHAT_A, None).unwrap();
        record_join_request(&conn, 7, CHAT_B, None).unwrap();
        record_join_request(&conn, 8, CHAT_A, None).unwrap();
        update_join_request_status(&conn, 7, CHAT_B, JoinRequestStatus::Approved).unwrap();

        let pending = pending_requests_for_user(&conn, 7).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].chat_id, CHAT_A);
    }

    #[test]
    fn count_by_status_groups_rows() {
        let conn = open_test_connection().unwrap();
        record_join_request(&conn, 1, CHAT_A, None).unwrap();
        record_join_request(&conn, 2, CHAT_A, None).unwrap();
        record_join_request(&conn, 3, CHAT_A, None).unwrap();
        update_join_request_status(&conn, 2, CHAT_A, JoinRequestStatus::Approved).unwrap();
        update_join_request_status(&conn, 3, CHAT_A, JoinRequestStatus::Rejected).unwrap();

        assert_eq!(count_by_status(&conn).unwrap(), (1, 1, 1));
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            JoinRequestStatus::Pending,
            JoinRequestStatus::Approved,
            JoinRequestStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<JoinRequestStatus>().unwrap(), status);
        }
        assert!("archived".parse::<JoinRequestStatus>().is_err());
    }
}
