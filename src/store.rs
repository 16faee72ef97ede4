//! Read-only access to the Messages database.
//!
//! Owns the join query across `chat`, `chat_message_join`, `message`, and
//! `handle`, the caller-seconds to store-ticks bound conversion, and the
//! per-column decoding of result rows into [`MessageRow`]. The ordering
//! clause is load-bearing: the document builder groups rows by contiguous
//! `chat_id` runs and relies on the store sorting by chat then time.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Row};
use std::path::Path;

use crate::models::MessageRow;
use crate::traits::SecondsSinceUnixEpoch;

const MESSAGE_QUERY: &str = "\
SELECT
    chat.ROWID AS chat_id,
    chat.chat_identifier,
    message.ROWID AS message_id,
    message.text,
    message.attributedBody,
    message.date,
    message.is_from_me,
    handle.id AS sender
FROM chat
JOIN chat_message_join ON chat.ROWID = chat_message_join.chat_id
JOIN message ON chat_message_join.message_id = message.ROWID
LEFT JOIN handle ON message.handle_id = handle.ROWID";

/// The store records message time as nanosecond ticks; callers speak in
/// epoch seconds.
const TICKS_PER_SECOND: f64 = 1e9;

/// Optional inclusive bounds on message time, in caller-facing epoch seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindow {
    pub since: Option<SecondsSinceUnixEpoch>,
    pub until: Option<SecondsSinceUnixEpoch>,
}

impl TimeWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(since: Option<SecondsSinceUnixEpoch>, until: Option<SecondsSinceUnixEpoch>) -> Self {
        Self { since, until }
    }
}

fn to_ticks(seconds: SecondsSinceUnixEpoch) -> i64 {
    (seconds * TICKS_PER_SECOND) as i64
}

/// Build the row query for a window: base join, conjunctive inclusive bound
/// predicates, and the chat-then-time ordering the builder depends on.
pub fn message_query(window: &TimeWindow) -> (String, Vec<i64>) {
    let mut sql = MESSAGE_QUERY.to_string();
    let mut params = Vec::new();

    let mut conditions = Vec::new();
    if let Some(since) = window.since {
        conditions.push("message.date >= ?");
        params.push(to_ticks(since));
    }
    if let Some(until) = window.until {
        conditions.push("message.date <= ?");
        params.push(to_ticks(until));
    }
    if !conditions.is_empty() {
        sql.push_str("\nWHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str("\nORDER BY chat.ROWID, message.date");
    (sql, params)
}

/// Open one exclusive read-only connection to the store.
///
/// The connection never creates a missing database file; a nonexistent or
/// unreadable store surfaces here and the caller degrades to an empty
/// stream.
pub async fn open(path: &Path) -> Result<SqliteConnection> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true);

    let conn = options.connect().await?;
    Ok(conn)
}

/// Decode one result row into a [`MessageRow`], column by column.
///
/// Any missing or mistyped field is an error; the connector treats that as
/// a malformed row and stops consuming the stream.
pub fn decode_row(row: &SqliteRow) -> Result<MessageRow, sqlx::Error> {
    Ok(MessageRow {
        chat_id: row.try_get("chat_id")?,
        chat_identifier: row.try_get("chat_identifier")?,
        message_id: row.try_get("message_id")?,
        text: row.try_get("text")?,
        attributed_body: row.try_get("attributedBody")?,
        date: row.try_get("date")?,
        is_from_me: row.try_get("is_from_me")?,
        sender: row.try_get("sender")?,
    })
}
