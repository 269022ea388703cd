//! In-memory notification feed
//!
//! Entries are appended per user and never rewritten. Each
//! (credential, status, expiration date) produces at most one entry per user,
//! even after the entry has been dismissed, for as long as the credential keeps
//! producing events. A user's feed holds at most [`MAX_ENTRIES_PER_USER`]
//! entries; the oldest are dropped first.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use super::types::{Notification, NotificationKind};
use crate::acesso::{ExpirationEvent, ExpirationStatus};

/// Entries kept per user
pub const MAX_ENTRIES_PER_USER: usize = 200;

type EventKey = (u64, ExpirationStatus, NaiveDate);

#[derive(Default)]
struct UserFeed {
    /// In insertion order
    entries: Vec<Notification>,
    seen: HashSet<EventKey>,
}

impl UserFeed {
    fn append(&mut self, notification: Notification) {
        self.entries.push(notification);
        if self.entries.len() > MAX_ENTRIES_PER_USER {
            let excess = self.entries.len() - MAX_ENTRIES_PER_USER;
            self.entries.drain(..excess);
        }
    }
}

#[derive(Default)]
struct FeedState {
    next_id: u64,
    users: HashMap<u64, UserFeed>,
}

impl FeedState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Notification feed for all users
#[derive(Default)]
pub struct NotificationFeed {
    state: RwLock<FeedState>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries for events this user has not been notified about yet
    ///
    /// `events` is the user's complete current event set. Keys of credentials
    /// absent from it (deleted, hidden or no longer expiring) are forgotten.
    /// Returns the number of new entries.
    pub async fn sync(&self, user_id: u64, events: &[ExpirationEvent], now: DateTime<Utc>) -> usize {
        let mut state = self.state.write().await;
        let FeedState { next_id, users } = &mut *state;
        let feed = users.entry(user_id).or_default();

        let current: HashSet<u64> = events.iter().map(|e| e.acesso_id).collect();
        feed.seen.retain(|(acesso_id, _, _)| current.contains(acesso_id));

        let mut added = 0;
        for event in events {
            let key = (event.acesso_id, event.status, event.expires_on);
            if feed.seen.contains(&key) {
                continue;
            }
            let Some((tipo, mensagem)) = Notification::describe(event) else {
                continue;
            };
            *next_id += 1;
            feed.seen.insert(key);
            feed.append(Notification {
                id: *next_id,
                tipo,
                mensagem,
                data: now,
            });
            added += 1;
        }

        if added > 0 {
            debug!("Added {} notifications for user {}", added, user_id);
        }
        added
    }

    /// Append a free-form entry
    pub async fn push(
        &self,
        user_id: u64,
        tipo: NotificationKind,
        mensagem: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Notification {
        let mut state = self.state.write().await;
        let notification = Notification {
            id: state.allocate_id(),
            tipo,
            mensagem: mensagem.into(),
            data: now,
        };
        state
            .users
            .entry(user_id)
            .or_default()
            .append(notification.clone());
        notification
    }

    /// The user's entries, newest first
    pub async fn list(&self, user_id: u64) -> Vec<Notification> {
        let state = self.state.read().await;
        let mut entries = state
            .users
            .get(&user_id)
            .map(|feed| feed.entries.clone())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.data.cmp(&a.data).then(b.id.cmp(&a.id)));
        entries
    }

    /// Remove one entry. Returns whether it existed.
    pub async fn dismiss(&self, user_id: u64, id: u64) -> bool {
        let mut state = self.state.write().await;
        let Some(feed) = state.users.get_mut(&user_id) else {
            return false;
        };
        let before = feed.entries.len();
        feed.entries.retain(|n| n.id != id);
        feed.entries.len() != before
    }

    /// Remove all of the user's entries
    pub async fn clear(&self, user_id: u64) {
        if let Some(feed) = self.state.write().await.users.get_mut(&user_id) {
            feed.entries.clear();
        }
    }
}
