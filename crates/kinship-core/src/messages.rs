use chrono::Utc;
use kinship_types::models::{Friendship, Message, NewMessage};
use kinship_types::outcome::SendOutcome;
use tracing::{debug, error, info};

use crate::recover;
use crate::repo::{FriendshipRepository, MessageRepository, UserRepository};

/// Sends a message through the friendship gate.
///
/// Checks run in a fixed order so callers can tell the failures apart:
/// both parties must exist, then they must be friends, and only then is the
/// row inserted with a server-side timestamp.
pub fn send_message<S>(store: &S, sender: &str, recipient: &str, subject: &str, body: &str) -> SendOutcome
where
    S: UserRepository + FriendshipRepository + MessageRepository + ?Sized,
{
    for username in [sender, recipient] {
        match store.find_user(username) {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("Cannot send {} -> {}: {} does not exist", sender, recipient, username);
                return SendOutcome::PartyMissing;
            }
            Err(e) => {
                error!("Store failure in send_message: {:#}", e);
                return SendOutcome::StoreFailure;
            }
        }
    }

    match store.find_friendship(&Friendship::new(sender, recipient)) {
        Ok(Some(_)) => {}
        Ok(None) => return SendOutcome::NotFriends,
        Err(e) => {
            error!("Store failure in send_message: {:#}", e);
            return SendOutcome::StoreFailure;
        }
    }

    let message = NewMessage {
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        date_sent: Utc::now(),
    };

    match store.insert_message(&message) {
        Ok(id) => {
            info!("Message {} sent {} -> {}", id, sender, recipient);
            SendOutcome::Sent(id)
        }
        Err(e) => {
            error!("Store failure in send_message: {:#}", e);
            SendOutcome::StoreFailure
        }
    }
}

/// Looks up a message regardless of either party's deleted flag.
pub fn get_message_by_id<S>(store: &S, message_id: i64) -> Option<Message>
where
    S: MessageRepository + ?Sized,
{
    recover("get_message_by_id", store.find_message(message_id))
}

pub fn get_sent_messages_for_user<S>(store: &S, sender: &str) -> Vec<Message>
where
    S: MessageRepository + ?Sized,
{
    recover("get_sent_messages_for_user", store.sent_messages(sender))
}

pub fn get_received_messages_for_user<S>(store: &S, recipient: &str) -> Vec<Message>
where
    S: MessageRepository + ?Sized,
{
    recover("get_received_messages_for_user", store.received_messages(recipient))
}

pub fn get_all_messages<S>(store: &S) -> Vec<Message>
where
    S: MessageRepository + ?Sized,
{
    recover("get_all_messages", store.all_messages())
}

/// Succeeds only when `recipient` is the message's stored recipient.
pub fn mark_message_as_read<S>(store: &S, message_id: i64, recipient: &str) -> bool
where
    S: MessageRepository + ?Sized,
{
    recover("mark_message_as_read", store.mark_read(message_id, recipient))
}

pub fn delete_message_for_sender<S>(store: &S, message_id: i64, sender: &str) -> bool
where
    S: MessageRepository + ?Sized,
{
    recover(
        "delete_message_for_sender",
        store.mark_deleted_for_sender(message_id, sender),
    )
}

pub fn delete_message_for_recipient<S>(store: &S, message_id: i64, recipient: &str) -> bool
where
    S: MessageRepository + ?Sized,
{
    recover(
        "delete_message_for_recipient",
        store.mark_deleted_for_recipient(message_id, recipient),
    )
}
