use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

/// A message meant for the user (toast, status line, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Sink for user-facing notifications. Rendering them is the front end's job.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Success,
            message: message.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Warning,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Error,
            message: message.to_string(),
        });
    }
}

/// Forwards notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(message = %notification.message, "notification"),
            NotificationLevel::Warning => tracing::warn!(message = %notification.message, "notification"),
            NotificationLevel::Error => tracing::error!(message = %notification.message, "notification"),
        }
    }
}

/// Keeps every notification until drained; front ends poll it after each action.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.received.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take all notifications received so far, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.lock().push(notification);
    }
}
