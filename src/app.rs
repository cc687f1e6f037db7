use std::collections::HashSet;

use ratatui::layout::Alignment;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::report;
use crate::session::SessionSummary;
use crate::store::CACHE_KEY;
use crate::trainer::{AnswerOutcome, Trainer};
use crate::translator::{Translate, TranslationService};
use crate::types::AppMode;

const SHOWN_MEANINGS: usize = 3;

pub struct App<P: Translate> {
    pub trainer: Trainer,
    pub translator: TranslationService<P>,
    pub mode: AppMode,
    pub input_buffer: String,
    pub status: Option<String>,
    pub last_outcome: Option<AnswerOutcome>,
    pub summary: Option<SessionSummary>,
    /// Set when the loop should fetch a new word before the next key press
    pub pending_word: bool,
    /// Keys of words that failed to translate during this session
    pub untranslatable: HashSet<String>,
    pub should_quit: bool,
}

impl<P: Translate> App<P> {
    pub fn new(trainer: Trainer, translator: TranslationService<P>) -> Self {
        Self {
            trainer,
            translator,
            mode: AppMode::Initial,
            input_buffer: String::new(),
            status: None,
            last_outcome: None,
            summary: None,
            pending_word: false,
            untranslatable: HashSet::new(),
            should_quit: false,
        }
    }

    pub fn handle_enter(&mut self) -> Result<()> {
        match self.mode {
            AppMode::Initial => self.request_word(),
            AppMode::Ready => {
                let input = std::mem::take(&mut self.input_buffer);
                self.handle_command(input.trim())?;
            }
            AppMode::Feedback => {
                let over = self
                    .last_outcome
                    .as_ref()
                    .is_some_and(|o| o.session_over.is_some());
                if over {
                    self.finish()?;
                } else {
                    self.request_word();
                }
            }
            AppMode::Ended => self.should_quit = true,
        }
        Ok(())
    }

    fn handle_command(&mut self, input: &str) -> Result<()> {
        match input.to_lowercase().as_str() {
            "" => {
                self.status = Some("Type a translation, or hint / skip / quit".to_string());
            }
            "quit" => self.finish()?,
            "hint" => {
                self.status = match self.trainer.hint() {
                    Some(hint) => Some(format!("Hint: {hint}")),
                    None => Some("No hint available".to_string()),
                };
            }
            "skip" => {
                let outcome = self.trainer.skip()?;
                self.show_outcome(outcome);
            }
            _ => {
                let outcome = self.trainer.submit_answer(input)?;
                self.show_outcome(outcome);
            }
        }
        Ok(())
    }

    fn show_outcome(&mut self, outcome: AnswerOutcome) {
        self.status = outcome.session_over.map(|r| r.describe().to_string());
        self.last_outcome = Some(outcome);
        self.mode = AppMode::Feedback;
    }

    fn request_word(&mut self) {
        self.status = Some("Fetching translation...".to_string());
        self.pending_word = true;
    }

    /// Selects words until one can be translated. Untranslatable words are
    /// passed over for the rest of the session without counting against the
    /// player. The session ends once every word in scope has failed.
    pub async fn next_word(&mut self) -> Result<()> {
        self.pending_word = false;
        let mut skipped: HashSet<String> = HashSet::new();
        loop {
            let entry = match self.trainer.select_next_word_excluding(&self.untranslatable) {
                Ok(entry) => entry,
                Err(e) => {
                    error!(error = %e, "No word to show");
                    return self.finish();
                }
            };

            match self.translator.meanings_for(&entry).await {
                Ok(meanings) => {
                    self.save_cache();
                    self.trainer.present(entry, meanings);
                    self.last_outcome = None;
                    self.status = skipped_status(&skipped);
                    self.mode = AppMode::Ready;
                    return Ok(());
                }
                Err(e) if e.is_recoverable() => {
                    warn!(word = %entry.word, error = %e, "Skipping untranslatable word");
                    self.untranslatable.insert(entry.key());
                    skipped.insert(entry.word);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn save_cache(&mut self) {
        if !self.translator.is_dirty() {
            return;
        }
        match self.trainer.store().save(CACHE_KEY, self.translator.cache()) {
            Ok(()) => self.translator.mark_saved(),
            Err(e) => warn!(error = %e, "Could not save translation cache"),
        }
    }

    /// Ends the session if one is running and shows the summary screen.
    pub fn finish(&mut self) -> Result<()> {
        self.pending_word = false;
        self.save_cache();
        if self.trainer.session().is_some() {
            let summary = self.trainer.end_session()?;
            info!(score = summary.score, "Showing session summary");
            self.status = Some(summary.end_reason.describe().to_string());
            self.summary = Some(summary);
        }
        self.mode = AppMode::Ended;
        Ok(())
    }

    pub fn handle_input(&mut self, c: char) {
        if self.mode == AppMode::Ready {
            self.input_buffer.push(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.mode == AppMode::Ready {
            self.input_buffer.pop();
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Score line
                Constraint::Percentage(20), // Current word
                Constraint::Length(3),      // Answer input
                Constraint::Percentage(25), // Feedback
                Constraint::Min(6),         // History
                Constraint::Length(3),      // Help
            ])
            .split(f.area());

        self.render_header(f, main_chunks[0]);
        self.render_word(f, main_chunks[1]);
        self.render_input(f, main_chunks[2]);
        self.render_feedback(f, main_chunks[3]);
        self.render_history(f, main_chunks[4]);
        self.render_help(f, main_chunks[5]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let scores = self.trainer.scores();
        let line = match self.trainer.session().map(|s| s.stats()) {
            Some(stats) => {
                let scope = match stats.target_level {
                    Some(level) => format!("{} {level}", stats.mode),
                    None => stats.mode.to_string(),
                };
                let best = match stats.target_level {
                    Some(level) => scores.best_for(level),
                    None => scores.best_for_mode(stats.mode),
                };
                Line::from(vec![
                    Span::styled(scope, Style::default().fg(Color::Cyan)),
                    Span::raw(format!(
                        " | Score {} | Streak {} | Best streak {} | High score {}",
                        stats.words_correct, stats.current_streak, stats.best_streak, best
                    )),
                ])
            }
            None => Line::from(format!("Overall high score {}", scores.overall)),
        };

        let header = Paragraph::new(line)
            .block(Block::default().title("Vocabulary Trainer").borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_word(&self, f: &mut Frame, area: Rect) {
        let entry = match self.mode {
            AppMode::Ready => self.trainer.current().map(|c| &c.entry),
            AppMode::Feedback => self.last_outcome.as_ref().map(|o| &o.entry),
            AppMode::Initial | AppMode::Ended => None,
        };
        let lines = match (self.mode, entry) {
            (AppMode::Initial, _) => vec![Line::from("Press Enter to start")],
            (AppMode::Ended, _) => vec![Line::from("Session over - press Enter to exit")],
            (_, Some(entry)) => vec![
                Line::from(Span::styled(
                    entry.word.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "({}, {} - {})",
                        entry.part_of_speech,
                        entry.level,
                        entry.level.short_description()
                    ),
                    Style::default().fg(Color::Gray),
                )),
            ],
            (_, None) => vec![Line::from("Loading...")],
        };

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Translate").borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    fn render_input(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!("Your answer ({})", self.trainer.config().target_language))
            .borders(Borders::ALL);
        let input = Paragraph::new(Line::from(vec![Span::raw(&self.input_buffer)]))
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(input, area);
    }

    fn render_feedback(&self, f: &mut Frame, area: Rect) {
        let mut text: Vec<Line> = Vec::new();

        if let Some(outcome) = &self.last_outcome {
            let (label, color) = if outcome.correct {
                ("Correct!", Color::Green)
            } else {
                ("Incorrect", Color::Red)
            };
            text.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            text.push(Line::from(format!(
                "Accepted: {}",
                outcome.accepted_meanings.join(", ")
            )));
            text.push(Line::from(format!(
                "Word accuracy {:.0}% over {} attempts, weight {:.2}",
                outcome.record.accuracy() * 100.0,
                outcome.record.total_attempts,
                outcome.record.weight
            )));
        }

        if let Some(status) = &self.status {
            text.push(Line::from(Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow),
            )));
        }

        if let Some(summary) = &self.summary {
            text.push(Line::from(format!(
                "Final score {} | accuracy {:.1}% | best streak {}",
                summary.score, summary.accuracy, summary.best_streak
            )));
            for record in &summary.new_records {
                text.push(Line::from(Span::styled(
                    format!("New {} high score!", report::describe_record(record)),
                    Style::default().fg(Color::Green),
                )));
            }
        }

        let feedback = Paragraph::new(text)
            .block(Block::default().title("Feedback").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(feedback, area);
    }

    fn render_history(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let history = self.trainer.history();
        let recent: Vec<Line> = history
            .recent_words
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::styled(format!("{} ", e.word), Style::default().fg(Color::Cyan)),
                    Span::raw(report::format_meanings(&e.meanings, SHOWN_MEANINGS)),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(recent)
                .block(Block::default().title("Recent Words").borders(Borders::ALL)),
            chunks[0],
        );

        let missed: Vec<Line> = history
            .wrong_words
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::styled(format!("{} ", e.word), Style::default().fg(Color::Red)),
                    Span::raw(report::format_meanings(&e.meanings, SHOWN_MEANINGS)),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(missed)
                .block(Block::default().title("Recent Mistakes").borders(Borders::ALL)),
            chunks[1],
        );
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = Line::from(vec![Span::raw(
            "ESC to quit | Enter to submit | Type 'hint', 'skip' or 'quit' as an answer",
        )]);
        let help = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
        f.render_widget(help, area);
    }
}

fn skipped_status(skipped: &HashSet<String>) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }
    let mut words: Vec<&str> = skipped.iter().map(String::as_str).collect();
    words.sort_unstable();
    Some(format!("Could not translate {}, skipping", words.join(", ")))
}
