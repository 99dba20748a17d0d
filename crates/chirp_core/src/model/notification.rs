//! Notification domain model.
//!
//! # Invariants
//! - Notifications are created only by follow and like operations.
//! - `read` is the only field ever changed after insertion.

use crate::model::user::{PublicProfile, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable notification identifier.
pub type NotificationId = Uuid;

/// What triggered the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "follow" => Some(Self::Follow),
            "like" => Some(Self::Like),
            _ => None,
        }
    }
}

/// Canonical notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub from: UserId,
    pub to: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: i64,
}

impl Notification {
    pub fn new(from: UserId, to: UserId, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            kind,
            read: false,
            created_at: 0,
        }
    }
}

/// Notification with the sender resolved to its public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub from: PublicProfile,
    pub to: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::{NotificationKind, NotificationRecord};
    use crate::model::user::PublicProfile;
    use uuid::Uuid;

    #[test]
    fn kind_text_roundtrip() {
        for kind in [NotificationKind::Follow, NotificationKind::Like] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("comment"), None);
    }

    #[test]
    fn record_serializes_kind_as_type() {
        let record = NotificationRecord {
            id: Uuid::new_v4(),
            from: PublicProfile {
                id: Uuid::new_v4(),
                username: "alice".to_string(),
                full_name: "Alice".to_string(),
                profile_img: None,
            },
            to: Uuid::new_v4(),
            kind: NotificationKind::Like,
            read: false,
            created_at: 1,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "like");
        assert_eq!(value["from"]["username"], "alice");
        assert!(value.get("kind").is_none());
    }
}
