//! User-notification output port.
//!
//! The envelope client and the push reconciler both surface user-visible
//! messages (toasts in the dashboard). The core never talks to a rendering
//! layer directly; it emits `Notice` values through the `Notify` trait and
//! the host decides how to display them. `LogNotifier` is the default sink
//! for headless hosts.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Display duration for auto-dismissing notices.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Success,
}

/// A single user-visible message. `timeout: None` means the notice stays
/// until dismissed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub timeout: Option<Duration>,
}

impl Notice {
    /// Auto-dismissing error notice.
    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into(), timeout: Some(NOTICE_TIMEOUT) }
    }

    /// Error notice that stays until dismissed.
    pub fn sticky_error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into(), timeout: None }
    }

    /// Auto-dismissing success notice.
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into(), timeout: Some(NOTICE_TIMEOUT) }
    }

    pub fn is_sticky(&self) -> bool {
        self.timeout.is_none()
    }
}

pub trait Notify: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub type Notifier = Arc<dyn Notify>;

/// Default sink: forwards notices to the log.
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!("notice: {}", notice.text),
            NoticeLevel::Success => info!("notice: {}", notice.text),
        }
    }
}
