//! User-visible notifications (toasts).

use std::sync::atomic::{AtomicUsize, Ordering};

/// Severity of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single toast with a unique ID
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Unique ID for keyed rendering
    pub id: usize,
    pub level: NotificationLevel,
    pub message: String,
}

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}
