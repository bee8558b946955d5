use anyhow::Result;
use kinship_core::repo::{BlogRepository, FriendshipRepository, MessageRepository, UserRepository};
use kinship_types::models::{BlogEntry, Friendship, Message, NewMessage, User};
use rusqlite::{Connection, params};

use crate::Database;
use crate::models::{BlogEntryRow, MessageRow, UserRow, format_timestamp};

// -- Users --

impl UserRepository for Database {
    fn find_user(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    fn is_admin(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let flag: Option<bool> = conn
                .query_row(
                    "SELECT is_admin FROM users WHERE username = ?1",
                    [username],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(flag.unwrap_or(false))
        })
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, first_name, last_name, is_admin)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.username,
                    user.password,
                    user.first_name,
                    user.last_name,
                    user.is_admin
                ],
            )?;
            Ok(())
        })
    }

    fn delete_user(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM users WHERE username = ?1", [username])?;
            Ok(removed > 0)
        })
    }
}

// -- Friendships --

impl FriendshipRepository for Database {
    fn insert_friendship(&self, friendship: &Friendship) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO friends (friend1, friend2) VALUES (?1, ?2)",
                [friendship.user1(), friendship.user2()],
            )?;
            Ok(inserted == 1)
        })
    }

    fn delete_friendship(&self, friendship: &Friendship) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM friends WHERE friend1 = ?1 AND friend2 = ?2",
                [friendship.user1(), friendship.user2()],
            )?;
            Ok(removed > 0)
        })
    }

    fn delete_friendships_of(&self, username: &str) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM friends WHERE friend1 = ?1 OR friend2 = ?1",
                [username],
            )?;
            Ok(removed)
        })
    }

    fn friendships_of(&self, username: &str) -> Result<Vec<Friendship>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT friend1, friend2 FROM friends
                 WHERE friend1 = ?1 OR friend2 = ?1
                 ORDER BY friend1, friend2",
            )?;

            let rows = stmt
                .query_map([username], |row| {
                    Ok(Friendship::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    fn find_friendship(&self, friendship: &Friendship) -> Result<Option<Friendship>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT friend1, friend2 FROM friends WHERE friend1 = ?1 AND friend2 = ?2",
                    [friendship.user1(), friendship.user2()],
                    |row| Ok(Friendship::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;
            Ok(row)
        })
    }
}

// -- Messages --

impl MessageRepository for Database {
    fn insert_message(&self, message: &NewMessage) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (sender, recipient, subject, body, date_sent)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    message.sender,
                    message.recipient,
                    message.subject,
                    message.body,
                    format_timestamp(&message.date_sent)
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn find_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM messages WHERE message_id = ?1", MessageRow::COLUMNS);
            let row = conn
                .query_row(&sql, [message_id], MessageRow::from_row)
                .optional()?;
            Ok(row.map(Message::from))
        })
    }

    fn sent_messages(&self, sender: &str) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "WHERE sender = ?1 AND deleted_for_sender = 0",
                &[&sender],
            )
        })
    }

    fn received_messages(&self, recipient: &str) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "WHERE recipient = ?1 AND deleted_for_recipient = 0",
                &[&recipient],
            )
        })
    }

    fn all_messages(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| query_messages(conn, "", &[]))
    }

    // SQLite counts rows matched by the WHERE clause, so repeating an update
    // that changes nothing still reports the row.
    fn mark_read(&self, message_id: i64, recipient: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let matched = conn.execute(
                "UPDATE messages SET read_status = 1 WHERE message_id = ?1 AND recipient = ?2",
                params![message_id, recipient],
            )?;
            Ok(matched > 0)
        })
    }

    fn mark_deleted_for_sender(&self, message_id: i64, sender: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let matched = conn.execute(
                "UPDATE messages SET deleted_for_sender = 1 WHERE message_id = ?1 AND sender = ?2",
                params![message_id, sender],
            )?;
            Ok(matched > 0)
        })
    }

    fn mark_deleted_for_recipient(&self, message_id: i64, recipient: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let matched = conn.execute(
                "UPDATE messages SET deleted_for_recipient = 1
                 WHERE message_id = ?1 AND recipient = ?2",
                params![message_id, recipient],
            )?;
            Ok(matched > 0)
        })
    }
}

// -- Blog --

impl BlogRepository for Database {
    fn insert_blog_entry(&self, username: &str, title: &str, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO blog_entries (username, title, content) VALUES (?1, ?2, ?3)",
                [username, title, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn delete_blog_entry(&self, entry_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM blog_entries WHERE entry_id = ?1", [entry_id])?;
            Ok(removed > 0)
        })
    }

    fn find_blog_entry(&self, entry_id: i64) -> Result<Option<BlogEntry>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM blog_entries WHERE entry_id = ?1",
                BlogEntryRow::COLUMNS
            );
            let row = conn
                .query_row(&sql, [entry_id], BlogEntryRow::from_row)
                .optional()?;
            Ok(row.map(BlogEntry::from))
        })
    }

    fn find_blog_entry_by_title(&self, title: &str) -> Result<Option<BlogEntry>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM blog_entries WHERE title = ?1 ORDER BY entry_id ASC LIMIT 1",
                BlogEntryRow::COLUMNS
            );
            let row = conn
                .query_row(&sql, [title], BlogEntryRow::from_row)
                .optional()?;
            Ok(row.map(BlogEntry::from))
        })
    }

    fn blog_entries_by_author(&self, username: &str) -> Result<Vec<BlogEntry>> {
        self.with_conn(|conn| query_blog_entries(conn, "WHERE username = ?1", &[&username]))
    }

    fn all_blog_entries(&self) -> Result<Vec<BlogEntry>> {
        self.with_conn(|conn| query_blog_entries(conn, "", &[]))
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE username = ?1", UserRow::COLUMNS);
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([username], UserRow::from_row).optional()?;

    Ok(row.map(User::from))
}

fn query_messages(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<Message>> {
    let sql = format!(
        "SELECT {} FROM messages {} ORDER BY date_sent DESC, message_id DESC",
        MessageRow::COLUMNS,
        filter
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(params, MessageRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(Message::from).collect())
}

fn query_blog_entries(
    conn: &Connection,
    filter: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<BlogEntry>> {
    let sql = format!(
        "SELECT {} FROM blog_entries {} ORDER BY entry_id DESC",
        BlogEntryRow::COLUMNS,
        filter
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map(params, BlogEntryRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(BlogEntry::from).collect())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
