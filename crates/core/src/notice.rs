//! User-facing notices, the session's replacement for modal alerts.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

pub type NoticeId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub level: NoticeLevel,
    pub message: String,
}

/// Bounded queue of pending notices.
///
/// A notice identical to the newest pending one is not queued twice, so a
/// user retrying the same bad file sees one message.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    queue: VecDeque<Notice>,
    capacity: usize,
    next_id: NoticeId,
}

impl NoticeBoard {
    pub fn new(capacity: usize) -> Self {
        Self { queue: VecDeque::new(), capacity: capacity.max(1), next_id: 1 }
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> NoticeId {
        let message = message.into();
        if let Some(newest) = self.queue.back() {
            if newest.level == level && newest.message == message {
                return newest.id;
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice { id, level, message });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> NoticeId {
        self.push(NoticeLevel::Info, message)
    }

    pub fn warn(&mut self, message: impl Into<String>) -> NoticeId {
        self.push(NoticeLevel::Warn, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> NoticeId {
        self.push(NoticeLevel::Error, message)
    }

    /// Pending notices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    /// Remove and return every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_newest_notice_is_not_repeated() {
        let mut board = NoticeBoard::default();

        let first = board.error("bad file");
        let second = board.error("bad file");

        assert_eq!(first, second);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn only_the_newest_entry_is_compared() {
        let mut board = NoticeBoard::default();

        board.error("bad file");
        board.info("loaded");
        board.error("bad file");

        let messages: Vec<_> = board.iter().map(|notice| notice.message.as_str()).collect();
        assert_eq!(messages, vec!["bad file", "loaded", "bad file"]);
    }

    #[test]
    fn same_message_at_another_level_is_kept() {
        let mut board = NoticeBoard::default();

        board.warn("slow");
        board.error("slow");

        assert_eq!(board.len(), 2);
    }

    #[test]
    fn oldest_notice_is_dropped_at_capacity() {
        let mut board = NoticeBoard::new(2);

        board.info("one");
        board.info("two");
        board.info("three");

        let drained = board.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "two");
        assert_eq!(drained[1].id, 3);
        assert!(board.is_empty());
    }
}
