//! Blocking notifications.
//!
//! Workflows push notices here; the next rendered page drains the queue and
//! shows each notice as a modal the operator has to dismiss.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

impl NoticeLevel {
    /// CSS class used by the layout.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "notice-success",
            Self::Error => "notice-error",
        }
    }
}

/// A message the operator must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// FIFO of pending notices shared by handlers and background workflows.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    inner: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "Notice queued");
        self.inner.lock().await.push_back(notice);
    }

    /// Take every pending notice, oldest first.
    pub async fn drain(&self) -> Vec<Notice> {
        self.inner.lock().await.drain(..).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_is_fifo_and_empties() {
        let queue = NoticeQueue::new();
        queue.push(Notice::success("first")).await;
        queue.push(Notice::error("second")).await;
        assert_eq!(queue.len().await, 2);

        let drained = queue.drain().await;
        assert_eq!(
            drained,
            vec![Notice::success("first"), Notice::error("second")]
        );
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_queue() {
        let queue = NoticeQueue::new();
        let handle = queue.clone();
        handle.push(Notice::error("boom")).await;
        assert_eq!(queue.drain().await.len(), 1);
    }
}
