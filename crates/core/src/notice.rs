//! User-facing notices.
//!
//! Recoverable failures (permission denied, provider errors, validation)
//! surface as a [`Notice`] pushed to a [`NoticeSink`]; the flow stays on
//! the current screen.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    PermissionRequired,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn permission_required(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::PermissionRequired,
            title: "Permission Required".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Success".to_string(),
            message: message.into(),
        }
    }

    /// Generic notice for unexpected failures caught at a flow boundary.
    pub fn unexpected() -> Self {
        Self::error("Something went wrong. Please try again.")
    }
}

/// Destination for notices. Implementations must not block.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that keeps every notice in memory, in arrival order.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NoticeSink for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_arrival_order() {
        let log = NoticeLog::new();
        assert!(log.is_empty());
        log.notify(Notice::permission_required("camera"));
        log.notify(Notice::success("done"));
        let notices = log.snapshot();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].kind, NoticeKind::PermissionRequired);
        assert_eq!(notices[0].title, "Permission Required");
        assert_eq!(notices[1].message, "done");
    }

    #[test]
    fn unexpected_is_generic_error() {
        let n = Notice::unexpected();
        assert_eq!(n.kind, NoticeKind::Error);
        assert!(n.message.contains("Something went wrong"));
    }
}
