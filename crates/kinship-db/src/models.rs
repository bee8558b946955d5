//! Database row types, mapped straight from SQLite columns.
//! Converted into the `kinship-types` models at the crate boundary.

use chrono::{DateTime, SecondsFormat, Utc};
use kinship_types::models::{BlogEntry, Message, User};
use rusqlite::Row;
use tracing::warn;

pub struct UserRow {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

impl UserRow {
    pub const COLUMNS: &'static str = "username, password, first_name, last_name, is_admin";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get(0)?,
            password: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            is_admin: row.get(4)?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            password: row.password,
            first_name: row.first_name,
            last_name: row.last_name,
            is_admin: row.is_admin,
        }
    }
}

pub struct MessageRow {
    pub message_id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read_status: bool,
    pub deleted_for_sender: bool,
    pub deleted_for_recipient: bool,
    pub date_sent: String,
}

impl MessageRow {
    pub const COLUMNS: &'static str = "message_id, sender, recipient, subject, body, \
         read_status, deleted_for_sender, deleted_for_recipient, date_sent";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            message_id: row.get(0)?,
            sender: row.get(1)?,
            recipient: row.get(2)?,
            subject: row.get(3)?,
            body: row.get(4)?,
            read_status: row.get(5)?,
            deleted_for_sender: row.get(6)?,
            deleted_for_recipient: row.get(7)?,
            date_sent: row.get(8)?,
        })
    }
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        let date_sent = parse_timestamp(&row.date_sent).unwrap_or_else(|| {
            warn!("Corrupt date_sent '{}' on message {}", row.date_sent, row.message_id);
            DateTime::default()
        });

        Self {
            message_id: row.message_id,
            sender: row.sender,
            recipient: row.recipient,
            subject: row.subject,
            body: row.body,
            read_status: row.read_status,
            deleted_for_sender: row.deleted_for_sender,
            deleted_for_recipient: row.deleted_for_recipient,
            date_sent,
        }
    }
}

pub struct BlogEntryRow {
    pub entry_id: i64,
    pub username: String,
    pub title: String,
    pub content: String,
}

impl BlogEntryRow {
    pub const COLUMNS: &'static str = "entry_id, username, title, content";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            entry_id: row.get(0)?,
            username: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
        })
    }
}

impl From<BlogEntryRow> for BlogEntry {
    fn from(row: BlogEntryRow) -> Self {
        Self {
            entry_id: row.entry_id,
            username: row.username,
            title: row.title,
            content: row.content,
        }
    }
}

/// Fixed-width RFC 3339 with millisecond precision, so that text order in
/// SQLite matches chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Only the RFC 3339 form written by [`format_timestamp`] is accepted.
/// Space-separated `datetime('now')` text would break the text ordering.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_round_trip_at_millisecond_precision() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let text = format_timestamp(&ts);
        assert_eq!(text, "2023-11-14T22:13:20.123Z");
        assert_eq!(parse_timestamp(&text), Some(ts));
    }

    #[test]
    fn only_rfc3339_timestamps_parse() {
        assert_eq!(
            parse_timestamp("2024-01-02T03:04:05.000Z"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
        // Would sort before any T-separated value of the same day
        assert_eq!(parse_timestamp("2024-01-02 03:04:05"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
