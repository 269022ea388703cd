//! Notification type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::acesso::{ExpirationEvent, ExpirationStatus};

/// Notification tag. Open set: unknown tags round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    /// Credential inside the alert window
    Alerta,
    /// Credential expired
    Critico,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Alerta => "ALERTA",
            NotificationKind::Critico => "CRITICO",
            NotificationKind::Other(tag) => tag,
        }
    }
}

impl From<String> for NotificationKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ALERTA" => NotificationKind::Alerta,
            "CRITICO" => NotificationKind::Critico,
            _ => NotificationKind::Other(tag),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub tipo: NotificationKind,
    pub mensagem: String,
    pub data: DateTime<Utc>,
}

impl Notification {
    /// Kind and message for an expiration event, or `None` for an active credential
    pub fn describe(event: &ExpirationEvent) -> Option<(NotificationKind, String)> {
        match event.status {
            ExpirationStatus::Expired => Some((
                NotificationKind::Critico,
                format!(
                    "The password for '{}' (owner: {}) expired on {}.",
                    event.title, event.owner_name, event.expires_on
                ),
            )),
            ExpirationStatus::NearExpiry => Some((
                NotificationKind::Alerta,
                format!(
                    "The password for '{}' (owner: {}) expires in {} {} ({}).",
                    event.title,
                    event.owner_name,
                    event.days_remaining,
                    if event.days_remaining == 1 { "day" } else { "days" },
                    event.expires_on
                ),
            )),
            ExpirationStatus::Active => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_kind_is_open() {
        let kind: NotificationKind = serde_json::from_str("\"INFO\"").unwrap();
        assert_eq!(kind, NotificationKind::Other("INFO".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"INFO\"");

        let kind: NotificationKind = serde_json::from_str("\"CRITICO\"").unwrap();
        assert_eq!(kind, NotificationKind::Critico);
    }

    #[test]
    fn test_describe() {
        let mut event = ExpirationEvent {
            acesso_id: 1,
            title: "DB".to_string(),
            owner_name: "Ana".to_string(),
            status: ExpirationStatus::NearExpiry,
            expires_on: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
            days_remaining: 2,
        };

        let (kind, message) = Notification::describe(&event).unwrap();
        assert_eq!(kind, NotificationKind::Alerta);
        assert_eq!(
            message,
            "The password for 'DB' (owner: Ana) expires in 2 days (2026-03-12)."
        );

        event.status = ExpirationStatus::Expired;
        let (kind, message) = Notification::describe(&event).unwrap();
        assert_eq!(kind, NotificationKind::Critico);
        assert_eq!(message, "The password for 'DB' (owner: Ana) expired on 2026-03-12.");

        event.status = ExpirationStatus::Active;
        assert!(Notification::describe(&event).is_none());
    }
}
