//! Expiration classification
//!
//! Status is derived from `dataExpiracao` and today's date on every read and
//! is never persisted, so it changes as time passes without any write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Expiration status of a credential at a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpirationStatus {
    Active,
    NearExpiry,
    Expired,
}

impl std::fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpirationStatus::Active => f.write_str("ACTIVE"),
            ExpirationStatus::NearExpiry => f.write_str("NEAR_EXPIRY"),
            ExpirationStatus::Expired => f.write_str("EXPIRED"),
        }
    }
}

/// Classifies expiration dates against a lookahead window
#[derive(Debug, Clone, Copy)]
pub struct ExpirationClassifier {
    alert_days: u32,
}

impl ExpirationClassifier {
    pub const DEFAULT_ALERT_DAYS: u32 = 7;

    pub fn new(alert_days: u32) -> Self {
        Self { alert_days }
    }

    pub fn alert_days(&self) -> u32 {
        self.alert_days
    }

    /// - `Expired` when the date is before today
    /// - `NearExpiry` when the date is today or within `alert_days` after it
    /// - `Active` otherwise, including when no date is set
    pub fn classify(&self, expires_on: Option<NaiveDate>, today: NaiveDate) -> ExpirationStatus {
        let Some(date) = expires_on else {
            return ExpirationStatus::Active;
        };

        if date < today {
            ExpirationStatus::Expired
        } else if (date - today).num_days() <= i64::from(self.alert_days) {
            ExpirationStatus::NearExpiry
        } else {
            ExpirationStatus::Active
        }
    }
}

impl Default for ExpirationClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALERT_DAYS)
    }
}

/// A credential currently expired or about to expire, as seen by one requester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpirationEvent {
    pub acesso_id: u64,
    pub title: String,
    pub owner_name: String,
    pub status: ExpirationStatus,
    pub expires_on: NaiveDate,
    /// Negative once expired
    pub days_remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn test_no_date_is_active() {
        let classifier = ExpirationClassifier::default();
        for d in 1..=30 {
            assert_eq!(classifier.classify(None, day(d)), ExpirationStatus::Active);
        }
    }

    #[test]
    fn test_past_date_stays_expired() {
        let classifier = ExpirationClassifier::default();
        for d in 11..=30 {
            assert_eq!(classifier.classify(Some(day(10)), day(d)), ExpirationStatus::Expired);
        }
    }

    #[test]
    fn test_window_boundaries() {
        let classifier = ExpirationClassifier::new(7);
        let today = day(10);

        assert_eq!(classifier.classify(Some(day(10)), today), ExpirationStatus::NearExpiry);
        assert_eq!(classifier.classify(Some(day(11)), today), ExpirationStatus::NearExpiry);
        assert_eq!(classifier.classify(Some(day(17)), today), ExpirationStatus::NearExpiry);
        assert_eq!(classifier.classify(Some(day(18)), today), ExpirationStatus::Active);
        assert_eq!(classifier.classify(Some(day(9)), today), ExpirationStatus::Expired);
    }

    #[test]
    fn test_zero_day_window() {
        let classifier = ExpirationClassifier::new(0);
        assert_eq!(classifier.classify(Some(day(10)), day(10)), ExpirationStatus::NearExpiry);
        assert_eq!(classifier.classify(Some(day(11)), day(10)), ExpirationStatus::Active);
    }
}
