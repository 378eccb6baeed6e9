//! Transient shopper notifications.
//!
//! At most one notification is visible. Showing a new one supersedes the
//! current one, and a notification stops being reported once its lifetime
//! has elapsed.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A notification as shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Instant,
}

impl Notification {
    /// Whether the notification is still visible at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Holder of the single visible notification.
#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    current: Mutex<Option<Notification>>,
}

impl NotificationCenter {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    /// Show a notification, replacing any visible one.
    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let message = message.into();
        match kind {
            NotificationKind::Success => tracing::info!(%message, "Notification"),
            NotificationKind::Error => tracing::warn!(%message, "Notification"),
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message,
            shown_at: Utc::now(),
            expires_at: Instant::now() + self.ttl,
        };
        if let Ok(mut current) = self.current.lock() {
            *current = Some(notification.clone());
        }
        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Error, message)
    }

    /// The visible notification, if any. Expired notifications are dropped.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        let mut current = self.current.lock().ok()?;
        if current
            .as_ref()
            .is_some_and(|n| !n.is_visible_at(Instant::now()))
        {
            *current = None;
        }
        current.clone()
    }

    /// Dismiss the visible notification early.
    pub fn dismiss(&self) {
        if let Ok(mut current) = self.current.lock() {
            *current = None;
        }
    }
}
