use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Users --

/// A registered account. Identity, hashing and ordering all use `username`
/// alone, compared byte-wise (case-sensitive).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.username.hash(state);
    }
}

impl PartialOrd for User {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for User {
    fn cmp(&self, other: &Self) -> Ordering {
        self.username.cmp(&other.username)
    }
}

/// Registration data before the password is hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
}

// -- Friendships --

/// An unordered pair of usernames, held in canonical order so that
/// `user1 <= user2`. The fields are private: the only way to build one is
/// through [`Friendship::new`], so every value is already canonical and the
/// derived equality and hash are order-independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Friendship {
    user1: String,
    user2: String,
}

impl Friendship {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a > b {
            Self { user1: b, user2: a }
        } else {
            Self { user1: a, user2: b }
        }
    }

    pub fn between(a: &User, b: &User) -> Self {
        Self::new(a.username.as_str(), b.username.as_str())
    }

    pub fn user1(&self) -> &str {
        &self.user1
    }

    pub fn user2(&self) -> &str {
        &self.user2
    }

    /// Both sides name the same user. Not rejected here.
    pub fn is_self(&self) -> bool {
        self.user1 == self.user2
    }

    pub fn involves(&self, username: &str) -> bool {
        self.user1 == username || self.user2 == username
    }

    /// The side of the pair that is not `username`.
    pub fn other(&self, username: &str) -> Option<&str> {
        if self.user1 == username {
            Some(&self.user2)
        } else if self.user2 == username {
            Some(&self.user1)
        } else {
            None
        }
    }
}

// -- Messages --

/// A private message between two friends.
///
/// Identity is `message_id`. The natural ordering is newest first, with the
/// id as a tie-break for messages sent within the same instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub read_status: bool,
    pub deleted_for_sender: bool,
    pub deleted_for_recipient: bool,
    pub date_sent: DateTime<Utc>,
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.message_id == other.message_id
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.message_id.hash(state);
    }
}

impl PartialOrd for Message {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Message {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .date_sent
            .cmp(&self.date_sent)
            .then_with(|| other.message_id.cmp(&self.message_id))
    }
}

/// A message about to be stored. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub date_sent: DateTime<Utc>,
}

// -- Blog --

/// A blog post. Identity is `entry_id`; ordering is newest (highest id) first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogEntry {
    pub entry_id: i64,
    pub username: String,
    pub title: String,
    pub content: String,
}

impl PartialEq for BlogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.entry_id == other.entry_id
    }
}

impl Eq for BlogEntry {}

impl Hash for BlogEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entry_id.hash(state);
    }
}

impl PartialOrd for BlogEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlogEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.entry_id.cmp(&self.entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::collections::hash_map::DefaultHasher;

    fn user(name: &str) -> User {
        User {
            username: name.to_string(),
            password: String::new(),
            first_name: None,
            last_name: None,
            is_admin: false,
        }
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn message(id: i64, secs: i64) -> Message {
        Message {
            message_id: id,
            sender: "ann".into(),
            recipient: "zack".into(),
            subject: "s".into(),
            body: "b".into(),
            read_status: false,
            deleted_for_sender: false,
            deleted_for_recipient: false,
            date_sent: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn friendship_is_canonical() {
        let f = Friendship::new("zack", "ann");
        assert_eq!(f.user1(), "ann");
        assert_eq!(f.user2(), "zack");
    }

    #[test]
    fn friendship_equality_ignores_argument_order() {
        let pairs = [("Ann", "Zack"), ("bob", "alice"), ("x", "x"), ("Zed", "abe")];
        for (a, b) in pairs {
            let ab = Friendship::between(&user(a), &user(b));
            let ba = Friendship::between(&user(b), &user(a));
            assert_eq!(ab, ba);
            assert_eq!(hash_of(&ab), hash_of(&ba));
        }

        let set: HashSet<_> = [Friendship::new("a", "b"), Friendship::new("b", "a")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn friendship_ordering_is_case_sensitive() {
        // 'Z' (0x5A) sorts before 'a' (0x61)
        let f = Friendship::new("ann", "Zack");
        assert_eq!(f.user1(), "Zack");
        assert_ne!(Friendship::new("ann", "zack"), Friendship::new("Ann", "zack"));
    }

    #[test]
    fn self_friendship_is_representable() {
        let f = Friendship::new("ann", "ann");
        assert!(f.is_self());
        assert_eq!(f.other("ann"), Some("ann"));
    }

    #[test]
    fn friendship_other_side() {
        let f = Friendship::new("zack", "ann");
        assert_eq!(f.other("ann"), Some("zack"));
        assert_eq!(f.other("zack"), Some("ann"));
        assert_eq!(f.other("bob"), None);
        assert!(f.involves("zack"));
        assert!(!f.involves("bob"));
    }

    #[test]
    fn user_identity_is_username_only() {
        let mut admin = user("ann");
        admin.is_admin = true;
        admin.first_name = Some("Ann".into());
        assert_eq!(admin, user("ann"));
        assert_eq!(hash_of(&admin), hash_of(&user("ann")));

        let mut users = vec![user("zack"), user("ann"), user("Bob")];
        users.sort();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["Bob", "ann", "zack"]);
    }

    #[test]
    fn user_password_is_not_serialized() {
        let mut u = user("ann");
        u.password = "$argon2id$secret".into();
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "ann");
    }

    #[test]
    fn messages_sort_newest_first() {
        let mut messages = vec![message(1, 100), message(2, 300), message(3, 200), message(4, 300)];
        messages.sort();
        let ids: Vec<_> = messages.iter().map(|m| m.message_id).collect();
        assert_eq!(ids, [4, 2, 3, 1]);
    }

    #[test]
    fn message_identity_is_id() {
        let mut read = message(7, 100);
        read.read_status = true;
        assert_eq!(read, message(7, 100));
        assert_ne!(message(7, 100), message(8, 100));
    }

    #[test]
    fn blog_entries_sort_newest_first() {
        let entry = |id| BlogEntry {
            entry_id: id,
            username: "ann".into(),
            title: "t".into(),
            content: "c".into(),
        };
        let mut entries = vec![entry(2), entry(9), entry(5)];
        entries.sort();
        let ids: Vec<_> = entries.iter().map(|e| e.entry_id).collect();
        assert_eq!(ids, [9, 5, 2]);
    }
}
