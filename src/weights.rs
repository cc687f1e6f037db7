use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::config::WeightConfig;
use crate::types::{Level, WordEntry};

/// Per-word performance record. `correct_attempts <= total_attempts`, and at
/// most one of the two streak counters is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub part_of_speech: String,
    pub level: Level,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    pub consecutive_correct: u32,
    pub consecutive_wrong: u32,
    pub last_seen: Option<DateTime<Utc>>,
    pub weight: f64,
}

impl WordRecord {
    pub fn new(entry: &WordEntry) -> Self {
        Self {
            word: entry.word.clone(),
            part_of_speech: entry.part_of_speech.clone(),
            level: entry.level,
            total_attempts: 0,
            correct_attempts: 0,
            consecutive_correct: 0,
            consecutive_wrong: 0,
            last_seen: None,
            weight: 1.0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.correct_attempts as f64 / self.total_attempts as f64
    }

    pub fn is_mastered(&self) -> bool {
        self.total_attempts >= 3 && self.accuracy() >= 0.8
    }

    pub fn record_attempt(&mut self, correct: bool, now: DateTime<Utc>, cfg: &WeightConfig) {
        self.total_attempts += 1;
        if correct {
            self.correct_attempts += 1;
            self.consecutive_correct += 1;
            self.consecutive_wrong = 0;
        } else {
            self.consecutive_wrong += 1;
            self.consecutive_correct = 0;
        }
        self.last_seen = Some(now);
        self.weight = self.calculate_weight(cfg);
    }

    /// Stored weight derived from accuracy, streaks and exposure.
    pub fn calculate_weight(&self, cfg: &WeightConfig) -> f64 {
        if self.total_attempts == 0 {
            return cfg.clamp(cfg.unseen_weight);
        }

        let accuracy = self.accuracy();
        let base = if accuracy >= cfg.high_accuracy {
            cfg.mastered_base
        } else if accuracy >= cfg.moderate_accuracy {
            cfg.moderate_base
        } else if accuracy >= cfg.low_accuracy {
            cfg.struggling_base
        } else {
            cfg.weak_base
        };

        let streak = if self.consecutive_correct >= cfg.correct_streak_threshold {
            cfg.correct_streak_multiplier
        } else if self.consecutive_wrong >= cfg.wrong_streak_threshold {
            cfg.wrong_streak_multiplier
        } else {
            1.0
        };

        let exposure = if self.total_attempts <= cfg.new_word_attempts {
            cfg.new_word_multiplier
        } else if self.total_attempts >= cfg.practiced_attempts {
            cfg.practiced_multiplier
        } else {
            1.0
        };

        let weight = cfg.clamp(base * streak * exposure);

        debug!(
            word = %self.word,
            accuracy = accuracy,
            consecutive_correct = self.consecutive_correct,
            consecutive_wrong = self.consecutive_wrong,
            base = base,
            streak_modifier = streak,
            exposure_modifier = exposure,
            final_weight = weight,
            "Weight calculation details"
        );

        weight
    }

    /// Weight used for sampling: the stored weight boosted when the word has
    /// not been seen for a while.
    pub fn effective_weight(&self, now: DateTime<Utc>, cfg: &WeightConfig) -> f64 {
        let stale = self
            .last_seen
            .map(|seen| (now - seen).num_hours() >= cfg.stale_after_hours)
            .unwrap_or(false);
        if stale {
            cfg.clamp(self.weight * cfg.stale_multiplier)
        } else {
            cfg.clamp(self.weight)
        }
    }
}

/// Aggregated progress for one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelProgress {
    pub total_words: usize,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub average_accuracy: f64,
    pub mastery: f64,
}

/// Persistent map from word key to its record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    records: HashMap<String, WordRecord>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, entry: &WordEntry) -> Option<&WordRecord> {
        self.records.get(&entry.key())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &WordRecord)> {
        self.records.iter()
    }

    pub fn record_result(
        &mut self,
        entry: &WordEntry,
        correct: bool,
        now: DateTime<Utc>,
        cfg: &WeightConfig,
    ) -> &WordRecord {
        let record = self
            .records
            .entry(entry.key())
            .or_insert_with(|| WordRecord::new(entry));
        record.record_attempt(correct, now, cfg);
        record
    }

    /// Sampling weight for `entry`; unseen words get `cfg.unseen_weight`.
    pub fn weight_for(&self, entry: &WordEntry, now: DateTime<Utc>, cfg: &WeightConfig) -> f64 {
        match self.records.get(&entry.key()) {
            Some(record) if record.total_attempts > 0 => record.effective_weight(now, cfg),
            _ => cfg.clamp(cfg.unseen_weight),
        }
    }

    pub fn level_progress(&self, level: Level) -> LevelProgress {
        let records: Vec<&WordRecord> = self.records.values().filter(|r| r.level == level).collect();
        if records.is_empty() {
            return LevelProgress::default();
        }

        let total_attempts: u32 = records.iter().map(|r| r.total_attempts).sum();
        let total_correct: u32 = records.iter().map(|r| r.correct_attempts).sum();
        let mastered = records.iter().filter(|r| r.is_mastered()).count();

        LevelProgress {
            total_words: records.len(),
            total_attempts,
            total_correct,
            average_accuracy: if total_attempts > 0 {
                total_correct as f64 / total_attempts as f64 * 100.0
            } else {
                0.0
            },
            mastery: mastered as f64 / records.len() as f64 * 100.0,
        }
    }

    /// Words that keep coming back: at least two attempts and a high weight.
    pub fn difficult_words(&self, level: Option<Level>, limit: usize) -> Vec<&WordRecord> {
        let mut words: Vec<&WordRecord> = self
            .records
            .values()
            .filter(|r| level.map_or(true, |l| r.level == l))
            .filter(|r| r.total_attempts >= 2 && r.weight >= 1.5)
            .collect();
        words.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.word.cmp(&b.word))
        });
        words.truncate(limit);
        words
    }

    pub fn mastered_words(&self, level: Option<Level>, limit: usize) -> Vec<&WordRecord> {
        let mut words: Vec<&WordRecord> = self
            .records
            .values()
            .filter(|r| level.map_or(true, |l| r.level == l))
            .filter(|r| r.is_mastered())
            .collect();
        words.sort_by(|a, b| {
            b.accuracy()
                .partial_cmp(&a.accuracy())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.consecutive_correct.cmp(&a.consecutive_correct))
                .then_with(|| a.word.cmp(&b.word))
        });
        words.truncate(limit);
        words
    }

    /// Drops every record of `level`; returns how many were removed.
    pub fn reset_level(&mut self, level: Level) -> usize {
        let before = self.records.len();
        self.records.retain(|_, r| r.level != level);
        before - self.records.len()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(word: &str, level: Level) -> WordEntry {
        WordEntry::new(word, "noun", level)
    }

    fn play(table: &mut WeightTable, e: &WordEntry, outcomes: &[bool], cfg: &WeightConfig) {
        let now = Utc::now();
        for &ok in outcomes {
            table.record_result(e, ok, now, cfg);
        }
    }

    #[test]
    fn record_result_updates_counters_and_streaks() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let house = entry("house", Level::A1);

        play(&mut table, &house, &[true, true], &cfg);
        let r = table.get(&house).unwrap();
        assert_eq!((r.total_attempts, r.correct_attempts), (2, 2));
        assert_eq!((r.consecutive_correct, r.consecutive_wrong), (2, 0));
        assert!(r.last_seen.is_some());

        play(&mut table, &house, &[false], &cfg);
        let r = table.get(&house).unwrap();
        assert_eq!((r.total_attempts, r.correct_attempts), (3, 2));
        assert_eq!((r.consecutive_correct, r.consecutive_wrong), (0, 1));
    }

    #[test]
    fn counters_stay_consistent_over_mixed_sequences() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let e = entry("river", Level::A2);
        let pattern = [true, false, false, true, true, true, false, true, false, false, false, true];
        for (i, ok) in pattern.iter().cycle().take(60).enumerate() {
            let r = table.record_result(&e, *ok, Utc::now(), &cfg);
            assert!(r.correct_attempts <= r.total_attempts, "step {i}");
            assert!(!(r.consecutive_correct > 0 && r.consecutive_wrong > 0), "step {i}");
            assert!(r.weight >= cfg.min_weight && r.weight <= cfg.max_weight, "step {i}");
        }
    }

    #[test]
    fn weight_stays_clamped_with_extreme_multipliers() {
        let cfg = WeightConfig {
            weak_base: 10.0,
            wrong_streak_multiplier: 10.0,
            mastered_base: 0.01,
            correct_streak_multiplier: 0.01,
            ..WeightConfig::default()
        };
        let mut table = WeightTable::new();
        let bad = entry("bad", Level::B1);
        let good = entry("good", Level::B1);
        play(&mut table, &bad, &[false; 5], &cfg);
        play(&mut table, &good, &[true; 5], &cfg);
        assert_eq!(table.get(&bad).unwrap().weight, cfg.max_weight);
        assert_eq!(table.get(&good).unwrap().weight, cfg.min_weight);
    }

    #[test]
    fn accurate_word_weighs_less_than_failing_word() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let easy = entry("easy", Level::A1);
        let hard = entry("hard", Level::A1);
        play(&mut table, &easy, &[true, true, true, true, false, true], &cfg);
        play(&mut table, &hard, &[true, false, false, false, false, false], &cfg);

        let easy_r = table.get(&easy).unwrap();
        let hard_r = table.get(&hard).unwrap();
        assert!(easy_r.accuracy() >= 0.8 && easy_r.consecutive_wrong == 0);
        assert!(hard_r.accuracy() < 0.4 && hard_r.consecutive_wrong >= 2);
        assert!(easy_r.weight < hard_r.weight);
    }

    #[test]
    fn concrete_weights_follow_the_bands() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let e = entry("cat", Level::A1);
        play(&mut table, &e, &[true], &cfg);
        // 100% accuracy, short streak, new word: 0.3 * 1.0 * 1.2
        assert!((table.get(&e).unwrap().weight - 0.36).abs() < 1e-9);

        let w = entry("dog", Level::A1);
        play(&mut table, &w, &[false, false], &cfg);
        // 0% accuracy, wrong streak: 2.0 * 2.5 * 1.2 = 6.0, clamped
        assert_eq!(table.get(&w).unwrap().weight, 5.0);
    }

    #[test]
    fn unseen_words_get_slightly_elevated_weight() {
        let cfg = WeightConfig::default();
        let table = WeightTable::new();
        let w = table.weight_for(&entry("new", Level::C1), Utc::now(), &cfg);
        assert_eq!(w, cfg.unseen_weight);
        assert!(w >= 1.0);
    }

    #[test]
    fn stale_words_are_boosted_at_selection_time() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let e = entry("old", Level::B2);
        let long_ago = Utc::now() - Duration::hours(cfg.stale_after_hours + 1);
        table.record_result(&e, true, long_ago, &cfg);
        let stored = table.get(&e).unwrap().weight;
        let effective = table.weight_for(&e, Utc::now(), &cfg);
        assert!((effective - stored * cfg.stale_multiplier).abs() < 1e-9);
        assert_eq!(table.weight_for(&e, long_ago, &cfg), stored);
    }

    #[test]
    fn level_progress_and_reset() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let a = entry("apple", Level::A1);
        let b = entry("bread", Level::A1);
        let c = entry("candid", Level::C1);
        play(&mut table, &a, &[true, true, true], &cfg);
        play(&mut table, &b, &[false], &cfg);
        play(&mut table, &c, &[true], &cfg);

        let progress = table.level_progress(Level::A1);
        assert_eq!(progress.total_words, 2);
        assert_eq!(progress.total_attempts, 4);
        assert_eq!(progress.total_correct, 3);
        assert!((progress.average_accuracy - 75.0).abs() < 1e-9);
        assert!((progress.mastery - 50.0).abs() < 1e-9);

        assert_eq!(table.reset_level(Level::A1), 2);
        assert_eq!(table.level_progress(Level::A1), LevelProgress::default());
        assert!(table.get(&c).is_some());
    }

    #[test]
    fn difficult_and_mastered_lists() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        let weak = entry("weak", Level::B1);
        let strong = entry("strong", Level::B1);
        play(&mut table, &weak, &[false, false, false], &cfg);
        play(&mut table, &strong, &[true, true, true, true], &cfg);

        let difficult = table.difficult_words(None, 5);
        assert_eq!(difficult.len(), 1);
        assert_eq!(difficult[0].word, "weak");

        let mastered = table.mastered_words(Some(Level::B1), 5);
        assert_eq!(mastered.len(), 1);
        assert_eq!(mastered[0].word, "strong");
        assert!(table.mastered_words(Some(Level::A1), 5).is_empty());
    }

    #[test]
    fn table_serializes_keyed_by_word() {
        let cfg = WeightConfig::default();
        let mut table = WeightTable::new();
        table.record_result(&entry("door", Level::A1), true, Utc::now(), &cfg);
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.get("door_noun_a1").is_some());
        let back: WeightTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
