use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::catalog::WordPool;
use crate::config::Config;
use crate::error::{Result, VocabError};
use crate::history::HistoryLog;
use crate::selector::WeightedSelector;
use crate::session::{Attempt, EndReason, HighScores, Session, SessionSummary};
use crate::store::{JsonStore, EXPORT_PREFIX, HISTORY_KEY, SCORES_KEY, SESSION_KEY, WEIGHTS_KEY};
use crate::translator::CacheStats;
use crate::types::{GameMode, Level, WordEntry};
use crate::validator;
use crate::weights::{LevelProgress, WeightTable, WordRecord};

const REPORT_LIST_LIMIT: usize = 10;

/// The word on screen together with the meanings accepted for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub entry: WordEntry,
    pub meanings: Vec<String>,
}

impl Challenge {
    /// First two characters of the first meaning, e.g. `ru...`.
    pub fn hint(&self) -> Option<String> {
        let first = validator::candidate_meanings(&self.meanings).into_iter().next()?;
        let prefix: String = first.chars().take(2).collect();
        Some(format!("{prefix}..."))
    }
}

#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub entry: WordEntry,
    pub correct: bool,
    pub accepted_meanings: Vec<String>,
    pub record: WordRecord,
    /// Set when this answer ended the session
    pub session_over: Option<EndReason>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsExport<'a> {
    pub exported_at: DateTime<Utc>,
    pub high_scores: &'a HighScores,
    pub level_progress: BTreeMap<Level, LevelProgress>,
    pub difficult_words: Vec<&'a WordRecord>,
    pub mastered_words: Vec<&'a WordRecord>,
    pub word_stats: &'a WeightTable,
    pub recent_history: &'a HistoryLog,
    pub cache_stats: CacheStats,
}

/// Game state owned by the quiz loop: loaded once, persisted at checkpoints.
pub struct Trainer {
    config: Config,
    store: JsonStore,
    pool: WordPool,
    weights: WeightTable,
    history: HistoryLog,
    scores: HighScores,
    selector: WeightedSelector,
    session: Option<Session>,
    current: Option<Challenge>,
}

impl Trainer {
    /// Reads weights, history and scores from the data directory. Missing or
    /// corrupt files start from empty state.
    pub fn load(config: Config, pool: WordPool, seed: Option<u64>) -> Self {
        let store = JsonStore::new(config.resolved_data_dir());
        let weights: WeightTable = store.load(WEIGHTS_KEY);
        let history: HistoryLog = store.load(HISTORY_KEY);
        let scores: HighScores = store.load(SCORES_KEY);
        let exclude = config.selection.exclude_recent;
        let selector = match seed {
            Some(seed) => WeightedSelector::seeded(seed, exclude),
            None => WeightedSelector::from_entropy(exclude),
        };

        info!(
            data_dir = %store.dir().display(),
            records = weights.len(),
            words = pool.len(),
            "Trainer loaded"
        );

        Self {
            config,
            store,
            pool,
            weights,
            history,
            scores,
            selector,
            session: None,
            current: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub fn pool(&self) -> &WordPool {
        &self.pool
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn current(&self) -> Option<&Challenge> {
        self.current.as_ref()
    }

    fn candidates(&self, mode: GameMode, level: Option<Level>) -> Vec<WordEntry> {
        match mode {
            GameMode::Custom => self.pool.words(level),
            GameMode::Adventure => self.pool.words_in(&self.config.selection.adventure_levels),
        }
    }

    /// Starts a new session. Custom mode needs a level; an empty word pool
    /// for the requested scope is a selection error.
    pub fn start_session(&mut self, mode: GameMode, level: Option<Level>) -> Result<()> {
        let level = match mode {
            GameMode::Custom => Some(level.ok_or_else(|| {
                VocabError::InvalidInput("custom mode needs a level".to_string())
            })?),
            GameMode::Adventure => None,
        };
        if self.candidates(mode, level).is_empty() {
            return Err(VocabError::Selection(format!(
                "no words available for {}",
                level.map_or_else(|| mode.to_string(), |l| l.to_string())
            )));
        }

        self.current = None;
        self.session = Some(Session::new(
            mode,
            level,
            self.config.session.clone(),
            Utc::now(),
        ));
        Ok(())
    }

    fn active_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .filter(|s| s.is_active())
            .ok_or_else(|| VocabError::InvalidInput("no active session".to_string()))
    }

    /// Picks the next word for the running session. A selection failure ends
    /// the session.
    pub fn select_next_word(&mut self) -> Result<WordEntry> {
        self.select_next_word_excluding(&HashSet::new())
    }

    /// Like `select_next_word`, but never returns a word whose key is in
    /// `skipped`. Fails with a selection error once every word in scope is
    /// skipped.
    pub fn select_next_word_excluding(&mut self, skipped: &HashSet<String>) -> Result<WordEntry> {
        let stats = self.active_session()?.stats();
        let (mode, target) = (stats.mode, stats.target_level);
        let allowed = |words: Vec<WordEntry>| -> Vec<WordEntry> {
            words
                .into_iter()
                .filter(|e| !skipped.contains(&e.key()))
                .collect()
        };

        let candidates = match mode {
            GameMode::Custom => allowed(self.pool.words(target)),
            GameMode::Adventure => {
                let levels = &self.config.selection.adventure_levels;
                let in_level = levels
                    .choose(self.selector.rng())
                    .map(|level| allowed(self.pool.words(Some(*level))))
                    .unwrap_or_default();
                if in_level.is_empty() {
                    allowed(self.pool.words_in(levels))
                } else {
                    in_level
                }
            }
        };

        let recent = self.history.recent_keys();
        let now = Utc::now();
        let picked = if candidates.is_empty() && !skipped.is_empty() {
            Err(VocabError::Selection(format!(
                "none of the remaining words could be translated ({} skipped)",
                skipped.len()
            )))
        } else {
            self.selector
                .select(&candidates, &self.weights, &recent, now, &self.config.weights)
                .cloned()
        };

        match picked {
            Ok(entry) => Ok(entry),
            Err(e) => {
                error!(error = %e, "Word selection failed, ending session");
                self.current = None;
                if let Some(session) = self.session.as_mut() {
                    session.end(EndReason::NoWords, now);
                }
                Err(e)
            }
        }
    }

    /// Puts `entry` on screen with the meanings the translator produced.
    pub fn present(&mut self, entry: WordEntry, meanings: Vec<String>) -> &Challenge {
        self.current.insert(Challenge { entry, meanings })
    }

    pub fn hint(&self) -> Option<String> {
        self.current.as_ref().and_then(Challenge::hint)
    }

    pub fn submit_answer(&mut self, text: &str) -> Result<AnswerOutcome> {
        self.resolve(Some(text))
    }

    /// Gives up on the current word; counted as a miss.
    pub fn skip(&mut self) -> Result<AnswerOutcome> {
        self.resolve(None)
    }

    fn resolve(&mut self, submitted: Option<&str>) -> Result<AnswerOutcome> {
        self.active_session()?;
        let challenge = self
            .current
            .take()
            .ok_or_else(|| VocabError::InvalidInput("no word is waiting for an answer".to_string()))?;

        let correct = submitted.is_some_and(|text| validator::validate(text, &challenge.meanings));
        let now = Utc::now();
        let record = self
            .weights
            .record_result(&challenge.entry, correct, now, &self.config.weights)
            .clone();

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| VocabError::InvalidInput("no active session".to_string()))?;
        let session_over = session.record_attempt(
            &Attempt {
                entry: &challenge.entry,
                submitted,
                correct,
                accepted: &challenge.meanings,
                at: now,
            },
            &mut self.history,
        )?;

        info!(
            word = %challenge.entry.word,
            correct = correct,
            weight = record.weight,
            "Answer checked"
        );

        self.checkpoint(correct);

        Ok(AnswerOutcome {
            entry: challenge.entry,
            correct,
            accepted_meanings: challenge.meanings,
            record,
            session_over,
        })
    }

    /// Saves weights and history; the session snapshot only after a correct
    /// answer. Failures are logged and play continues.
    fn checkpoint(&self, correct: bool) {
        self.persist(WEIGHTS_KEY, &self.weights);
        self.persist(HISTORY_KEY, &self.history);
        if correct {
            if let Some(session) = &self.session {
                self.persist(SESSION_KEY, session.stats());
            }
        }
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.store.save(key, value) {
            warn!(key = key, error = %e, "Could not save state");
        }
    }

    /// Ends the running session, merges it into the high scores and saves.
    pub fn end_session(&mut self) -> Result<SessionSummary> {
        let mut session = self
            .session
            .take()
            .ok_or_else(|| VocabError::InvalidInput("no session to end".to_string()))?;
        self.current = None;

        let summary = session.finalize(&mut self.scores, Utc::now());
        self.persist(SCORES_KEY, &self.scores);
        self.persist(WEIGHTS_KEY, &self.weights);
        self.persist(HISTORY_KEY, &self.history);
        if let Err(e) = self.store.remove(SESSION_KEY) {
            warn!(error = %e, "Could not clear session checkpoint");
        }

        info!(
            score = summary.score,
            accuracy = summary.accuracy,
            reason = ?summary.end_reason,
            "Session summary ready"
        );
        Ok(summary)
    }

    /// Forgets weights, history and the level record for `level`. Returns the
    /// number of word records removed.
    pub fn reset_level(&mut self, level: Level) -> Result<usize> {
        let removed = self.weights.reset_level(level);
        self.history.remove_level(level);
        self.scores.reset_level(level);

        self.store.save(WEIGHTS_KEY, &self.weights)?;
        self.store.save(HISTORY_KEY, &self.history)?;
        self.store.save(SCORES_KEY, &self.scores)?;
        info!(level = %level, removed = removed, "Level reset");
        Ok(removed)
    }

    /// Deletes saved progress, cached translations and exports, then returns
    /// to a fresh state. Other files in the data directory are kept.
    pub fn factory_reset(&mut self) -> Result<usize> {
        let removed = self.store.remove_all()?;
        self.weights.clear();
        self.history.clear();
        self.scores = HighScores::default();
        self.session = None;
        self.current = None;
        warn!(files = removed, "Factory reset");
        Ok(removed)
    }

    pub fn level_progress(&self) -> BTreeMap<Level, LevelProgress> {
        Level::ALL
            .iter()
            .map(|level| (*level, self.weights.level_progress(*level)))
            .collect()
    }

    /// Writes `export_<timestamp>.json` into the data directory.
    pub fn export_statistics(&self, cache_stats: CacheStats, now: DateTime<Utc>) -> Result<PathBuf> {
        let export = StatisticsExport {
            exported_at: now,
            high_scores: &self.scores,
            level_progress: self.level_progress(),
            difficult_words: self.weights.difficult_words(None, REPORT_LIST_LIMIT),
            mastered_words: self.weights.mastered_words(None, REPORT_LIST_LIMIT),
            word_stats: &self.weights,
            recent_history: &self.history,
            cache_stats,
        };
        let file_name = format!("{EXPORT_PREFIX}{}.json", now.format("%Y%m%d_%H%M%S"));
        let path = self.store.save_as(&file_name, &export)?;
        info!(path = %path.display(), "Statistics exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionRules;
    use tempfile::{tempdir, TempDir};

    fn pool() -> WordPool {
        WordPool::new(vec![
            WordEntry::new("house", "noun", Level::A1),
            WordEntry::new("car", "noun", Level::A1),
            WordEntry::new("water", "noun", Level::A1),
            WordEntry::new("ship", "noun", Level::B1),
        ])
    }

    fn trainer(rules: SessionRules) -> (Trainer, TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            session: rules,
            ..Config::default()
        };
        (Trainer::load(config, pool(), Some(11)), dir)
    }

    fn meanings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn custom_mode_needs_a_level_with_words() {
        let (mut t, _dir) = trainer(SessionRules::default());
        assert!(matches!(
            t.start_session(GameMode::Custom, None),
            Err(VocabError::InvalidInput(_))
        ));
        assert!(matches!(
            t.start_session(GameMode::Custom, Some(Level::C2)),
            Err(VocabError::Selection(_))
        ));
        assert!(t.select_next_word().is_err());
    }

    #[test]
    fn custom_mode_only_picks_from_level() {
        let (mut t, _dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::B1)).unwrap();
        for _ in 0..5 {
            assert_eq!(t.select_next_word().unwrap().word, "ship");
        }
    }

    #[test]
    fn correct_answer_updates_weights_and_checkpoints() {
        let (mut t, dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
        let entry = t.select_next_word().unwrap();
        t.present(entry.clone(), meanings(&["kata", "arti"]));

        let outcome = t.submit_answer("  Kata ").unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.session_over, None);
        assert_eq!(outcome.record.total_attempts, 1);
        assert_eq!(t.weights().get(&entry).unwrap().correct_attempts, 1);
        assert!(dir.path().join("word_weights.json").exists());
        assert!(dir.path().join("current_session.json").exists());
        assert!(t.current().is_none());
    }

    #[test]
    fn wrong_answer_ends_session_and_summary_is_saved() {
        let (mut t, dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
        let entry = t.select_next_word().unwrap();
        t.present(entry, meanings(&["kapal"]));

        let outcome = t.submit_answer("kap").unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.session_over, Some(EndReason::WrongAnswer));
        assert!(t.select_next_word().is_err());

        let summary = t.end_session().unwrap();
        assert_eq!(summary.end_reason, EndReason::WrongAnswer);
        assert_eq!(summary.missed.len(), 1);
        assert_eq!(summary.missed[0].user_answer.as_deref(), Some("kap"));
        assert!(dir.path().join("top_score.json").exists());
        assert!(!dir.path().join("current_session.json").exists());
    }

    #[test]
    fn skip_is_a_miss_without_ending_by_default() {
        let (mut t, _dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
        let entry = t.select_next_word().unwrap();
        t.present(entry.clone(), meanings(&["rumah"]));
        assert_eq!(t.hint().as_deref(), Some("ru..."));

        let outcome = t.skip().unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.session_over, None);
        assert_eq!(t.weights().get(&entry).unwrap().consecutive_wrong, 1);
        assert!(t.session().unwrap().is_active());
        assert!(matches!(t.skip(), Err(VocabError::InvalidInput(_))));
    }

    #[test]
    fn excluded_words_are_never_picked() {
        let (mut t, _dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
        let skipped: HashSet<String> = ["house_noun_a1", "car_noun_a1"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        for _ in 0..10 {
            assert_eq!(t.select_next_word_excluding(&skipped).unwrap().word, "water");
        }
    }

    #[test]
    fn excluding_every_word_ends_session_with_selection_error() {
        let (mut t, _dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Adventure, None).unwrap();
        let skipped: HashSet<String> = t.pool().entries().iter().map(WordEntry::key).collect();
        let err = t.select_next_word_excluding(&skipped).unwrap_err();
        assert!(matches!(err, VocabError::Selection(_)));
        assert_eq!(t.session().unwrap().end_reason(), Some(EndReason::NoWords));
    }

    #[test]
    fn adventure_mode_stays_within_adventure_levels() {
        let (mut t, _dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Adventure, None).unwrap();
        for _ in 0..20 {
            let entry = t.select_next_word().unwrap();
            assert!(t.config().selection.adventure_levels.contains(&entry.level));
        }
    }

    #[test]
    fn state_survives_reload() {
        let (mut t, dir) = trainer(SessionRules::default());
        t.start_session(GameMode::Custom, Some(Level::B1)).unwrap();
        let entry = t.select_next_word().unwrap();
        t.present(entry.clone(), meanings(&["kapal"]));
        t.submit_answer("kapal").unwrap();
        t.end_session().unwrap();

        let config = t.config().clone();
        let reloaded = Trainer::load(config, pool(), None);
        assert_eq!(reloaded.weights().get(&entry).unwrap().total_attempts, 1);
        assert_eq!(reloaded.scores().best_for(Level::B1), 1);
        assert_eq!(reloaded.history().recent_words.len(), 1);
        drop(dir);
    }

    #[test]
    fn reset_level_leaves_other_levels() {
        let (mut t, _dir) = trainer(SessionRules {
            end_on_wrong: false,
            ..SessionRules::default()
        });
        t.start_session(GameMode::Custom, Some(Level::A1)).unwrap();
        let a1 = t.select_next_word().unwrap();
        t.present(a1.clone(), meanings(&["x1"]));
        t.submit_answer("x1").unwrap();
        t.end_session().unwrap();

        t.start_session(GameMode::Custom, Some(Level::B1)).unwrap();
        let b1 = t.select_next_word().unwrap();
        t.present(b1.clone(), meanings(&["kapal"]));
        t.submit_answer("kapal").unwrap();
        t.end_session().unwrap();

        assert_eq!(t.reset_level(Level::A1).unwrap(), 1);
        assert!(t.weights().get(&a1).is_none());
        assert!(t.weights().get(&b1).is_some());
        assert_eq!(t.scores().best_for(Level::A1), 0);
        assert_eq!(t.scores().best_for(Level::B1), 1);
    }

    #[test]
    fn export_writes_timestamped_file() {
        let (t, dir) = trainer(SessionRules::default());
        let now = Utc::now();
        let path = t
            .export_statistics(
                CacheStats {
                    cache_size: 0,
                    cached_words: Vec::new(),
                },
                now,
            )
            .unwrap();
        assert_eq!(path.parent().unwrap(), dir.path());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("export_{}.json", now.format("%Y%m%d_%H%M%S")));
        let body: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(body["high_scores"]["overall"], 0);
    }
}
