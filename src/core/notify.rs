//! Toast queue drained by the presentation layer.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::config::MAX_NOTIFICATIONS;
use crate::models::Notification;

/// Pending toasts, oldest first. The oldest is dropped once the queue is full.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: RefCell<VecDeque<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        let mut pending = self.pending.borrow_mut();
        if pending.len() == MAX_NOTIFICATIONS {
            pending.pop_front();
        }
        pending.push_back(notification);
    }

    /// Take every pending notification.
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}
