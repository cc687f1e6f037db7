use std::fmt::Write;

use crate::history::HistoryLog;
use crate::session::{HighScores, NewRecord, SessionSummary};
use crate::types::{GameMode, Level};
use crate::weights::WeightTable;

const LIST_LIMIT: usize = 10;
const SHOWN_MEANINGS: usize = 3;

/// `a, b, c (+2 more)` when there are more than `limit` meanings.
pub fn format_meanings(meanings: &[String], limit: usize) -> String {
    if meanings.len() <= limit {
        return meanings.join(", ");
    }
    format!(
        "{} (+{} more)",
        meanings[..limit].join(", "),
        meanings.len() - limit
    )
}

pub fn describe_record(record: &NewRecord) -> String {
    match record {
        NewRecord::Overall => "overall".to_string(),
        NewRecord::Level(level) => format!("level {level}"),
        NewRecord::Mode(mode) => format!("{mode} mode"),
    }
}

pub fn statistics(scores: &HighScores, weights: &WeightTable, history: &HistoryLog) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== High scores ===");
    let _ = writeln!(out, "Overall:   {}", scores.overall);
    for mode in [GameMode::Custom, GameMode::Adventure] {
        let _ = writeln!(out, "{:<10} {}", format!("{mode}:"), scores.best_for_mode(mode));
    }
    for level in Level::ALL {
        let _ = writeln!(
            out,
            "  {level} {:<20} {}",
            level.short_description(),
            scores.best_for(level)
        );
    }

    let _ = writeln!(out, "\n=== Level progress ===");
    for level in Level::ALL {
        let p = weights.level_progress(level);
        if p.total_words == 0 {
            let _ = writeln!(out, "  {level}  not practiced yet");
            continue;
        }
        let _ = writeln!(
            out,
            "  {level}  {} words, {} attempts, accuracy {:.1}%, mastery {:.1}%",
            p.total_words, p.total_attempts, p.average_accuracy, p.mastery
        );
    }

    let difficult = weights.difficult_words(None, LIST_LIMIT);
    if !difficult.is_empty() {
        let _ = writeln!(out, "\n=== Difficult words ===");
        for r in difficult {
            let _ = writeln!(
                out,
                "  {} ({}, {})  weight {:.2}, accuracy {:.0}%",
                r.word,
                r.part_of_speech,
                r.level,
                r.weight,
                r.accuracy() * 100.0
            );
        }
    }

    let mastered = weights.mastered_words(None, LIST_LIMIT);
    if !mastered.is_empty() {
        let _ = writeln!(out, "\n=== Mastered words ===");
        for r in mastered {
            let _ = writeln!(
                out,
                "  {} ({})  accuracy {:.0}%, streak {}",
                r.word,
                r.level,
                r.accuracy() * 100.0,
                r.consecutive_correct
            );
        }
    }

    if !history.wrong_words.is_empty() {
        let _ = writeln!(out, "\n=== Recently missed ===");
        for entry in history.wrong_words.iter() {
            let _ = writeln!(
                out,
                "  {} ({}) -> {}",
                entry.word,
                entry.level,
                format_meanings(&entry.meanings, SHOWN_MEANINGS)
            );
        }
    }

    if let Some(last) = scores.sessions.last() {
        let _ = writeln!(
            out,
            "\nLast session: {} {}, score {}, accuracy {:.1}%",
            last.mode,
            last.level.map(|l| l.to_string()).unwrap_or_default(),
            last.score,
            last.accuracy
        );
    }

    out
}

/// Printed after the quiz screen closes. Missed words list every meaning.
pub fn session_summary(summary: &SessionSummary) -> String {
    let mut out = String::new();
    let scope = match summary.target_level {
        Some(level) => format!("{} mode, level {level}", summary.mode),
        None => format!("{} mode", summary.mode),
    };

    let _ = writeln!(out, "=== Session over ({scope}) ===");
    let _ = writeln!(out, "{}", summary.end_reason.describe());
    let _ = writeln!(
        out,
        "Score {} | {} attempted | accuracy {:.1}% | best streak {}",
        summary.score, summary.words_attempted, summary.accuracy, summary.best_streak
    );
    if summary.skips > 0 {
        let _ = writeln!(out, "Skipped {}", summary.skips);
    }
    let minutes = (summary.ended_at - summary.started_at).num_seconds() as f64 / 60.0;
    let _ = writeln!(out, "Played for {minutes:.1} min");

    if summary.level_breakdown.len() > 1 {
        let _ = writeln!(out, "\nBy level:");
        for (level, tally) in &summary.level_breakdown {
            let _ = writeln!(out, "  {level}: {}/{}", tally.correct, tally.attempted);
        }
    }

    for record in &summary.new_records {
        let _ = writeln!(out, "New {} high score: {}!", describe_record(record), summary.score);
    }

    if !summary.missed.is_empty() {
        let _ = writeln!(out, "\nMissed words:");
        for missed in &summary.missed {
            let answer = missed.user_answer.as_deref().unwrap_or("(skipped)");
            let _ = writeln!(
                out,
                "  {} ({}, {})  you said: {}  accepted: {}",
                missed.word,
                missed.part_of_speech,
                missed.level,
                answer,
                missed.accepted_meanings.join(", ")
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeightConfig;
    use crate::session::{EndReason, LevelTally, MissedWord};
    use crate::types::WordEntry;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn meanings_are_shortened_with_count() {
        let m = strings(&["a", "b", "c", "d", "e"]);
        assert_eq!(format_meanings(&m, 3), "a, b, c (+2 more)");
        assert_eq!(format_meanings(&m[..2], 3), "a, b");
    }

    #[test]
    fn empty_statistics_show_defaults() {
        let text = statistics(&HighScores::default(), &WeightTable::new(), &HistoryLog::default());
        assert!(text.contains("Overall:   0"));
        assert!(text.contains("A1  not practiced yet"));
        assert!(!text.contains("Difficult words"));
    }

    #[test]
    fn statistics_list_difficult_words() {
        let cfg = WeightConfig::default();
        let mut weights = WeightTable::new();
        let entry = WordEntry::new("currency", "noun", Level::B1);
        weights.record_result(&entry, false, Utc::now(), &cfg);
        weights.record_result(&entry, false, Utc::now(), &cfg);
        let text = statistics(&HighScores::default(), &weights, &HistoryLog::default());
        assert!(text.contains("Difficult words"));
        assert!(text.contains("currency (noun, B1)"));
    }

    #[test]
    fn summary_shows_full_meanings_for_missed_words() {
        let now = Utc::now();
        let mut breakdown = BTreeMap::new();
        breakdown.insert(Level::A1, LevelTally { attempted: 2, correct: 1 });
        breakdown.insert(Level::B1, LevelTally { attempted: 1, correct: 0 });
        let summary = SessionSummary {
            mode: GameMode::Adventure,
            target_level: None,
            score: 1,
            words_attempted: 3,
            words_correct: 1,
            accuracy: 33.3,
            best_streak: 1,
            skips: 1,
            level_breakdown: breakdown,
            missed: vec![MissedWord {
                word: "currency".to_string(),
                part_of_speech: "noun".to_string(),
                level: Level::B1,
                user_answer: None,
                accepted_meanings: strings(&["mata uang", "valuta", "uang", "duit"]),
            }],
            end_reason: EndReason::Quit,
            new_records: vec![NewRecord::Mode(GameMode::Adventure)],
            started_at: now,
            ended_at: now,
        };

        let text = session_summary(&summary);
        assert!(text.contains("Adventure mode"));
        assert!(text.contains("mata uang, valuta, uang, duit"));
        assert!(text.contains("(skipped)"));
        assert!(text.contains("New Adventure mode high score: 1!"));
        assert!(text.contains("B1: 0/1"));
    }
}
