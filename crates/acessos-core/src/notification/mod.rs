//! Per-user notification feed

mod feed;
mod types;

pub use feed::{NotificationFeed, MAX_ENTRIES_PER_USER};
pub use types::{Notification, NotificationKind};
