use kinship_types::models::BlogEntry;
use tracing::{error, info};

use crate::recover;
use crate::repo::BlogRepository;

/// Returns the new entry id, or `None` if the store refused the insert
/// (for example, an unknown author).
pub fn add_blog_entry<S>(store: &S, username: &str, title: &str, content: &str) -> Option<i64>
where
    S: BlogRepository + ?Sized,
{
    match store.insert_blog_entry(username, title, content) {
        Ok(id) => {
            info!("Blog entry {} added by {}", id, username);
            Some(id)
        }
        Err(e) => {
            error!("Store failure in add_blog_entry: {:#}", e);
            None
        }
    }
}

pub fn remove_blog_entry<S>(store: &S, entry_id: i64) -> bool
where
    S: BlogRepository + ?Sized,
{
    recover("remove_blog_entry", store.delete_blog_entry(entry_id))
}

pub fn find_blog_entries_by_author<S>(store: &S, username: &str) -> Vec<BlogEntry>
where
    S: BlogRepository + ?Sized,
{
    recover("find_blog_entries_by_author", store.blog_entries_by_author(username))
}

pub fn find_blog_entry_by_id<S>(store: &S, entry_id: i64) -> Option<BlogEntry>
where
    S: BlogRepository + ?Sized,
{
    recover("find_blog_entry_by_id", store.find_blog_entry(entry_id))
}

/// Only the first (oldest) entry is returned when several share a title.
pub fn find_blog_entry_by_title<S>(store: &S, title: &str) -> Option<BlogEntry>
where
    S: BlogRepository + ?Sized,
{
    recover("find_blog_entry_by_title", store.find_blog_entry_by_title(title))
}

pub fn find_all_blog_entries<S>(store: &S) -> Vec<BlogEntry>
where
    S: BlogRepository + ?Sized,
{
    recover("find_all_blog_entries", store.all_blog_entries())
}
