//! Recording notifier for tests.

use opsdash_sync::{Notice, NoticeLevel, Notify};
use std::sync::{Arc, Mutex};

/// `Notify` implementation that records every notice so tests can assert
/// on what the user would have seen.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All recorded notices, in emission order.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    /// Notices whose text contains the given fragment.
    pub fn containing(&self, needle: &str) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.text.contains(needle))
            .cloned()
            .collect()
    }

    pub fn count_level(&self, level: NoticeLevel) -> usize {
        self.notices.lock().unwrap().iter().filter(|n| n.level == level).count()
    }

    pub fn clear(&self) {
        self.notices.lock().unwrap().clear();
    }
}

impl Notify for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        log::info!("[MOCK] notice ({:?}): {}", notice.level, notice.text);
        self.notices.lock().unwrap().push(notice);
    }
}
