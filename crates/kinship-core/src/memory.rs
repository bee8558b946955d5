//! An in-process store for tests and local experiments.
//!
//! Behaves like the SQLite store where it matters to the rules: duplicate
//! keys and unknown users are errors, deleting a user cascades, and list
//! queries honour the per-party deleted flags and newest-first ordering.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow, bail};
use kinship_types::models::{BlogEntry, Friendship, Message, NewMessage, User};

use crate::repo::{BlogRepository, FriendshipRepository, MessageRepository, UserRepository};

#[derive(Default)]
struct Inner {
    users: BTreeMap<String, User>,
    friends: HashSet<Friendship>,
    messages: BTreeMap<i64, Message>,
    blog_entries: BTreeMap<i64, BlogEntry>,
    next_message_id: i64,
    next_entry_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every repository call fails as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inserts a user directly, with an empty password hash.
    pub fn seed_user(&self, username: &str, is_admin: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.users.insert(
                username.to_string(),
                User {
                    username: username.to_string(),
                    password: String::new(),
                    first_name: None,
                    last_name: None,
                    is_admin,
                },
            );
        }
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Inner) -> Result<T>,
    {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("memory store unavailable");
        }
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| anyhow!("Memory store lock poisoned: {}", e))?;
        f(&mut inner)
    }
}

fn newest_first<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort();
    items
}

impl UserRepository for MemoryStore {
    fn find_user(&self, username: &str) -> Result<Option<User>> {
        self.with_inner(|inner| Ok(inner.users.get(username).cloned()))
    }

    fn is_admin(&self, username: &str) -> Result<bool> {
        self.with_inner(|inner| Ok(inner.users.get(username).is_some_and(|u| u.is_admin)))
    }

    fn insert_user(&self, user: &User) -> Result<()> {
        self.with_inner(|inner| {
            if inner.users.contains_key(&user.username) {
                bail!("duplicate username {}", user.username);
            }
            inner.users.insert(user.username.clone(), user.clone());
            Ok(())
        })
    }

    fn delete_user(&self, username: &str) -> Result<bool> {
        self.with_inner(|inner| {
            if inner.users.remove(username).is_none() {
                return Ok(false);
            }
            inner.friends.retain(|f| !f.involves(username));
            inner
                .messages
                .retain(|_, m| m.sender != username && m.recipient != username);
            inner.blog_entries.retain(|_, e| e.username != username);
            Ok(true)
        })
    }
}

impl FriendshipRepository for MemoryStore {
    fn insert_friendship(&self, friendship: &Friendship) -> Result<bool> {
        self.with_inner(|inner| {
            for username in [friendship.user1(), friendship.user2()] {
                if !inner.users.contains_key(username) {
                    bail!("foreign key violation: unknown user {}", username);
                }
            }
            Ok(inner.friends.insert(friendship.clone()))
        })
    }

    fn delete_friendship(&self, friendship: &Friendship) -> Result<bool> {
        self.with_inner(|inner| Ok(inner.friends.remove(friendship)))
    }

    fn delete_friendships_of(&self, username: &str) -> Result<usize> {
        self.with_inner(|inner| {
            let before = inner.friends.len();
            inner.friends.retain(|f| !f.involves(username));
            Ok(before - inner.friends.len())
        })
    }

    fn friendships_of(&self, username: &str) -> Result<Vec<Friendship>> {
        self.with_inner(|inner| {
            let mut found: Vec<Friendship> = inner
                .friends
                .iter()
                .filter(|f| f.involves(username))
                .cloned()
                .collect();
            found.sort_by(|a, b| (a.user1(), a.user2()).cmp(&(b.user1(), b.user2())));
            Ok(found)
        })
    }

    fn find_friendship(&self, friendship: &Friendship) -> Result<Option<Friendship>> {
        self.with_inner(|inner| Ok(inner.friends.get(friendship).cloned()))
    }
}

impl MessageRepository for MemoryStore {
    fn insert_message(&self, message: &NewMessage) -> Result<i64> {
        self.with_inner(|inner| {
            for username in [&message.sender, &message.recipient] {
                if !inner.users.contains_key(username) {
                    bail!("foreign key violation: unknown user {}", username);
                }
            }
            inner.next_message_id += 1;
            let id = inner.next_message_id;
            inner.messages.insert(
                id,
                Message {
                    message_id: id,
                    sender: message.sender.clone(),
                    recipient: message.recipient.clone(),
                    subject: message.subject.clone(),
                    body: message.body.clone(),
                    read_status: false,
                    deleted_for_sender: false,
                    deleted_for_recipient: false,
                    date_sent: message.date_sent,
                },
            );
            Ok(id)
        })
    }

    fn find_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.with_inner(|inner| Ok(inner.messages.get(&message_id).cloned()))
    }

    fn sent_messages(&self, sender: &str) -> Result<Vec<Message>> {
        self.with_inner(|inner| {
            Ok(newest_first(
                inner
                    .messages
                    .values()
                    .filter(|m| m.sender == sender && !m.deleted_for_sender)
                    .cloned(),
            ))
        })
    }

    fn received_messages(&self, recipient: &str) -> Result<Vec<Message>> {
        self.with_inner(|inner| {
            Ok(newest_first(
                inner
                    .messages
                    .values()
                    .filter(|m| m.recipient == recipient && !m.deleted_for_recipient)
                    .cloned(),
            ))
        })
    }

    fn all_messages(&self) -> Result<Vec<Message>> {
        self.with_inner(|inner| Ok(newest_first(inner.messages.values().cloned())))
    }

    fn mark_read(&self, message_id: i64, recipient: &str) -> Result<bool> {
        self.with_inner(|inner| match inner.messages.get_mut(&message_id) {
            Some(m) if m.recipient == recipient => {
                m.read_status = true;
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    fn mark_deleted_for_sender(&self, message_id: i64, sender: &str) -> Result<bool> {
        self.with_inner(|inner| match inner.messages.get_mut(&message_id) {
            Some(m) if m.sender == sender => {
                m.deleted_for_sender = true;
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    fn mark_deleted_for_recipient(&self, message_id: i64, recipient: &str) -> Result<bool> {
        self.with_inner(|inner| match inner.messages.get_mut(&message_id) {
            Some(m) if m.recipient == recipient => {
                m.deleted_for_recipient = true;
                Ok(true)
            }
            _ => Ok(false),
        })
    }
}

impl BlogRepository for MemoryStore {
    fn insert_blog_entry(&self, username: &str, title: &str, content: &str) -> Result<i64> {
        self.with_inner(|inner| {
            if !inner.users.contains_key(username) {
                bail!("foreign key violation: unknown user {}", username);
            }
            inner.next_entry_id += 1;
            let id = inner.next_entry_id;
            inner.blog_entries.insert(
                id,
                BlogEntry {
                    entry_id: id,
                    username: username.to_string(),
                    title: title.to_string(),
                    content: content.to_string(),
                },
            );
            Ok(id)
        })
    }

    fn delete_blog_entry(&self, entry_id: i64) -> Result<bool> {
        self.with_inner(|inner| Ok(inner.blog_entries.remove(&entry_id).is_some()))
    }

    fn find_blog_entry(&self, entry_id: i64) -> Result<Option<BlogEntry>> {
        self.with_inner(|inner| Ok(inner.blog_entries.get(&entry_id).cloned()))
    }

    fn find_blog_entry_by_title(&self, title: &str) -> Result<Option<BlogEntry>> {
        // BTreeMap iterates in ascending id order
        self.with_inner(|inner| {
            Ok(inner
                .blog_entries
                .values()
                .find(|e| e.title == title)
                .cloned())
        })
    }

    fn blog_entries_by_author(&self, username: &str) -> Result<Vec<BlogEntry>> {
        self.with_inner(|inner| {
            Ok(newest_first(
                inner
                    .blog_entries
                    .values()
                    .filter(|e| e.username == username)
                    .cloned(),
            ))
        })
    }

    fn all_blog_entries(&self) -> Result<Vec<BlogEntry>> {
        self.with_inner(|inner| Ok(newest_first(inner.blog_entries.values().cloned())))
    }
}
