use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::SessionRules;
use crate::error::{Result, VocabError};
use crate::history::HistoryLog;
use crate::types::{GameMode, Level, WordEntry};

/// Number of finished sessions kept in the high score file.
pub const SESSION_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Quit,
    WrongAnswer,
    SkipLimit,
    CorrectLimit,
    NoWords,
}

impl EndReason {
    pub fn describe(&self) -> &'static str {
        match self {
            EndReason::Quit => "You ended the session",
            EndReason::WrongAnswer => "Game over: wrong answer",
            EndReason::SkipLimit => "Game over: too many skips",
            EndReason::CorrectLimit => "Target reached",
            EndReason::NoWords => "No more words to practice",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTally {
    pub attempted: u32,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedWord {
    pub word: String,
    pub part_of_speech: String,
    pub level: Level,
    /// `None` when the word was skipped
    pub user_answer: Option<String>,
    pub accepted_meanings: Vec<String>,
}

/// One answered (or skipped) word as seen by the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub entry: &'a WordEntry,
    pub submitted: Option<&'a str>,
    pub correct: bool,
    pub accepted: &'a [String],
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub mode: GameMode,
    pub target_level: Option<Level>,
    pub started_at: DateTime<Utc>,
    pub words_attempted: u32,
    pub words_correct: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub skips: u32,
    pub level_stats: BTreeMap<Level, LevelTally>,
    pub missed: Vec<MissedWord>,
}

impl SessionStats {
    fn new(mode: GameMode, target_level: Option<Level>, started_at: DateTime<Utc>) -> Self {
        Self {
            mode,
            target_level,
            started_at,
            words_attempted: 0,
            words_correct: 0,
            current_streak: 0,
            best_streak: 0,
            skips: 0,
            level_stats: BTreeMap::new(),
            missed: Vec::new(),
        }
    }

    /// Percentage of correct answers, 0 when nothing was attempted.
    pub fn accuracy(&self) -> f64 {
        if self.words_attempted == 0 {
            0.0
        } else {
            self.words_correct as f64 / self.words_attempted as f64 * 100.0
        }
    }
}

/// A single game: Active until quit or a losing/limit condition, then Ended.
#[derive(Debug, Clone)]
pub struct Session {
    stats: SessionStats,
    rules: SessionRules,
    state: SessionState,
    end_reason: Option<EndReason>,
    ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(
        mode: GameMode,
        target_level: Option<Level>,
        rules: SessionRules,
        now: DateTime<Utc>,
    ) -> Self {
        info!(mode = %mode, level = ?target_level, "Session started");
        Self {
            stats: SessionStats::new(mode, target_level, now),
            rules,
            state: SessionState::Active,
            end_reason: None,
            ended_at: None,
        }
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn score(&self) -> u32 {
        self.stats.words_correct
    }

    /// Counts the attempt, updates the history logs and returns the reason
    /// the session ended if this attempt ended it.
    pub fn record_attempt(
        &mut self,
        attempt: &Attempt<'_>,
        history: &mut HistoryLog,
    ) -> Result<Option<EndReason>> {
        if !self.is_active() {
            return Err(VocabError::InvalidInput(
                "session has already ended".to_string(),
            ));
        }

        let stats = &mut self.stats;
        stats.words_attempted += 1;
        let tally = stats.level_stats.entry(attempt.entry.level).or_default();
        tally.attempted += 1;

        history.record(attempt.entry, attempt.accepted, attempt.correct, attempt.at);

        let mut ended = None;
        if attempt.correct {
            tally.correct += 1;
            stats.words_correct += 1;
            stats.current_streak += 1;
            stats.best_streak = stats.best_streak.max(stats.current_streak);
            if self
                .rules
                .correct_limit
                .is_some_and(|limit| stats.words_correct >= limit)
            {
                ended = Some(EndReason::CorrectLimit);
            }
        } else {
            stats.current_streak = 0;
            stats.missed.push(MissedWord {
                word: attempt.entry.word.clone(),
                part_of_speech: attempt.entry.part_of_speech.clone(),
                level: attempt.entry.level,
                user_answer: attempt.submitted.map(str::to_string),
                accepted_meanings: attempt.accepted.to_vec(),
            });
            if attempt.submitted.is_none() {
                stats.skips += 1;
                if self.rules.max_skips.is_some_and(|max| stats.skips > max) {
                    ended = Some(EndReason::SkipLimit);
                }
            } else if self.rules.end_on_wrong {
                ended = Some(EndReason::WrongAnswer);
            }
        }

        debug!(
            word = %attempt.entry.word,
            correct = attempt.correct,
            score = stats.words_correct,
            streak = stats.current_streak,
            "Attempt recorded"
        );

        if let Some(reason) = ended {
            self.end(reason, attempt.at);
        }
        Ok(ended)
    }

    /// Active -> Ended. Ending twice keeps the first reason.
    pub fn end(&mut self, reason: EndReason, now: DateTime<Utc>) {
        if self.is_active() {
            info!(reason = ?reason, score = self.score(), "Session ended");
            self.state = SessionState::Ended;
            self.end_reason = Some(reason);
            self.ended_at = Some(now);
        }
    }

    /// Ends the session (as a quit if it is still running), folds it into
    /// `scores` and returns the summary.
    pub fn finalize(&mut self, scores: &mut HighScores, now: DateTime<Utc>) -> SessionSummary {
        self.end(EndReason::Quit, now);
        let ended_at = self.ended_at.unwrap_or(now);
        let end_reason = self.end_reason.unwrap_or(EndReason::Quit);
        let new_records = scores.apply(&self.stats, end_reason, ended_at);

        SessionSummary {
            mode: self.stats.mode,
            target_level: self.stats.target_level,
            score: self.stats.words_correct,
            words_attempted: self.stats.words_attempted,
            words_correct: self.stats.words_correct,
            accuracy: self.stats.accuracy(),
            best_streak: self.stats.best_streak,
            skips: self.stats.skips,
            level_breakdown: self.stats.level_stats.clone(),
            missed: self.stats.missed.clone(),
            end_reason,
            new_records,
            started_at: self.stats.started_at,
            ended_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "scope", rename_all = "snake_case")]
pub enum NewRecord {
    Overall,
    Level(Level),
    Mode(GameMode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub mode: GameMode,
    pub target_level: Option<Level>,
    pub score: u32,
    pub words_attempted: u32,
    pub words_correct: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    pub skips: u32,
    pub level_breakdown: BTreeMap<Level, LevelTally>,
    pub missed: Vec<MissedWord>,
    pub end_reason: EndReason,
    pub new_records: Vec<NewRecord>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub mode: GameMode,
    pub level: Option<Level>,
    pub score: u32,
    pub words_attempted: u32,
    pub accuracy: f64,
    pub best_streak: u32,
    pub end_reason: EndReason,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub overall: u32,
    pub by_level: BTreeMap<Level, u32>,
    pub by_mode: BTreeMap<GameMode, u32>,
    /// Oldest first
    pub sessions: Vec<SessionRecord>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self {
            overall: 0,
            by_level: Level::ALL.iter().map(|l| (*l, 0)).collect(),
            by_mode: [GameMode::Custom, GameMode::Adventure]
                .into_iter()
                .map(|m| (m, 0))
                .collect(),
            sessions: Vec::new(),
        }
    }
}

impl HighScores {
    pub fn best_for(&self, level: Level) -> u32 {
        self.by_level.get(&level).copied().unwrap_or(0)
    }

    pub fn best_for_mode(&self, mode: GameMode) -> u32 {
        self.by_mode.get(&mode).copied().unwrap_or(0)
    }

    /// Merges a finished session; returns the records it beat.
    pub fn apply(
        &mut self,
        stats: &SessionStats,
        end_reason: EndReason,
        ended_at: DateTime<Utc>,
    ) -> Vec<NewRecord> {
        let score = stats.words_correct;
        let mut records = Vec::new();

        if score > self.overall {
            self.overall = score;
            records.push(NewRecord::Overall);
        }
        // level records only count when the player chose the level
        if let (GameMode::Custom, Some(level)) = (stats.mode, stats.target_level) {
            let best = self.by_level.entry(level).or_insert(0);
            if score > *best {
                *best = score;
                records.push(NewRecord::Level(level));
            }
        }
        let best = self.by_mode.entry(stats.mode).or_insert(0);
        if score > *best {
            *best = score;
            records.push(NewRecord::Mode(stats.mode));
        }

        self.sessions.push(SessionRecord {
            mode: stats.mode,
            level: stats.target_level,
            score,
            words_attempted: stats.words_attempted,
            accuracy: stats.accuracy(),
            best_streak: stats.best_streak,
            end_reason,
            started_at: stats.started_at,
            ended_at,
        });
        if self.sessions.len() > SESSION_HISTORY_LIMIT {
            let excess = self.sessions.len() - SESSION_HISTORY_LIMIT;
            self.sessions.drain(..excess);
        }

        if !records.is_empty() {
            info!(score = score, records = ?records, "New high score");
        }
        records
    }

    /// Clears the level record and that level's custom sessions.
    pub fn reset_level(&mut self, level: Level) {
        self.by_level.insert(level, 0);
        self.sessions
            .retain(|s| !(s.mode == GameMode::Custom && s.level == Some(level)));
    }
}
