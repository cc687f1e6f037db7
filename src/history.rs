use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{Level, WordEntry};

pub const HISTORY_CAPACITY: usize = 10;

/// Newest-first log holding at most `N` entries; the oldest is evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
pub struct BoundedLog<T: Clone, const N: usize> {
    entries: VecDeque<T>,
}

impl<T: Clone, const N: usize> BoundedLog<T, N> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(N),
        }
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn push(&mut self, item: T) {
        self.entries.push_front(item);
        self.entries.truncate(N);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.entries.retain(keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T: Clone, const N: usize> Default for BoundedLog<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> From<Vec<T>> for BoundedLog<T, N> {
    fn from(mut items: Vec<T>) -> Self {
        items.truncate(N);
        Self {
            entries: items.into(),
        }
    }
}

impl<T: Clone, const N: usize> From<BoundedLog<T, N>> for Vec<T> {
    fn from(log: BoundedLog<T, N>) -> Self {
        log.entries.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub word: String,
    pub part_of_speech: String,
    pub level: Level,
    pub meanings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(entry: &WordEntry, meanings: &[String], timestamp: DateTime<Utc>) -> Self {
        Self {
            word: entry.word.clone(),
            part_of_speech: entry.part_of_speech.clone(),
            level: entry.level,
            meanings: meanings.to_vec(),
            timestamp,
        }
    }

    /// The word this entry was recorded for.
    pub fn entry(&self) -> WordEntry {
        WordEntry {
            word: self.word.clone(),
            part_of_speech: self.part_of_speech.clone(),
            level: self.level,
        }
    }

    pub fn key(&self) -> String {
        self.entry().key()
    }
}

/// Recently appeared and recently missed words, persisted across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryLog {
    pub recent_words: BoundedLog<HistoryEntry, HISTORY_CAPACITY>,
    pub wrong_words: BoundedLog<HistoryEntry, HISTORY_CAPACITY>,
}

impl HistoryLog {
    pub fn record(&mut self, entry: &WordEntry, meanings: &[String], correct: bool, now: DateTime<Utc>) {
        let item = HistoryEntry::new(entry, meanings, now);
        if !correct {
            self.wrong_words.push(item.clone());
        }
        self.recent_words.push(item);
    }

    /// Keys of recently shown words, newest first.
    pub fn recent_keys(&self) -> Vec<String> {
        self.recent_words.iter().map(HistoryEntry::key).collect()
    }

    pub fn remove_level(&mut self, level: Level) {
        self.recent_words.retain(|e| e.level != level);
        self.wrong_words.retain(|e| e.level != level);
    }

    pub fn clear(&mut self) {
        self.recent_words.clear();
        self.wrong_words.clear();
    }
}
