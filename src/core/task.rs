//! Cancellable async steps bound to the lifetime of their owner.
//!
//! Each panel (and the connected session) owns a [`TaskScope`]. Operations
//! started from that panel run through [`TaskScope::run`]; leaving the panel
//! calls [`TaskScope::cancel`], which aborts every pending step so a late
//! completion can no longer mutate shared state.

use std::cell::{Cell, RefCell};
use std::future::Future;

use futures::future::{AbortHandle, Abortable};
use tracing::debug;

use crate::core::error::WalletError;

/// Set of abortable operations owned by one panel or session.
#[derive(Debug)]
pub struct TaskScope {
    name: &'static str,
    next_id: Cell<u64>,
    handles: RefCell<Vec<(u64, AbortHandle)>>,
}

impl TaskScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: Cell::new(0),
            handles: RefCell::new(Vec::new()),
        }
    }

    /// Run `fut` until it completes or the scope is cancelled.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, WalletError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let (handle, registration) = AbortHandle::new_pair();
        self.handles.borrow_mut().push((id, handle));

        let result = Abortable::new(fut, registration).await;
        self.handles.borrow_mut().retain(|(other, _)| *other != id);

        result.map_err(|_| {
            debug!(scope = self.name, "task aborted");
            WalletError::Cancelled
        })
    }

    /// Abort every pending operation in this scope.
    pub fn cancel(&self) {
        let handles = std::mem::take(&mut *self.handles.borrow_mut());
        if !handles.is_empty() {
            debug!(scope = self.name, pending = handles.len(), "cancelling scope");
        }
        for (_, handle) in handles {
            handle.abort();
        }
    }

    /// Number of operations still pending.
    pub fn pending(&self) -> usize {
        self.handles.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    #[tokio::test]
    async fn test_completed_task_returns_output() {
        let scope = TaskScope::new("test");
        assert_eq!(scope.run(async { 7 }).await, Ok(7));
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_task() {
        let scope = TaskScope::new("test");
        let (result, ()) = futures::join!(scope.run(future::pending::<()>()), async {
            assert_eq!(scope.pending(), 1);
            scope.cancel();
        });
        assert_eq!(result, Err(WalletError::Cancelled));
        assert_eq!(scope.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancel_does_not_affect_later_tasks() {
        let scope = TaskScope::new("test");
        scope.cancel();
        assert_eq!(scope.run(async { "ok" }).await, Ok("ok"));
    }
}
