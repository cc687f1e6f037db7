use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Result, VocabError};
use crate::types::{Level, WordEntry};

const BUILTIN_WORDS: &str = include_str!("../data/oxford_sample.csv");

#[derive(Debug, Deserialize)]
struct CatalogRow {
    word: Option<String>,
    class: Option<String>,
    level: Option<String>,
}

/// Static catalog of words tagged with level and part of speech.
#[derive(Debug, Clone, Default)]
pub struct WordPool {
    entries: Vec<WordEntry>,
}

impl WordPool {
    pub fn new(entries: Vec<WordEntry>) -> Self {
        Self { entries }
    }

    /// Reads a `word,class,level` CSV. Rows with blank fields or an unknown
    /// level are dropped; a file without any usable row is a data error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        for required in ["word", "class", "level"] {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(required)) {
                return Err(VocabError::Data(format!(
                    "word list must contain columns word, class, level (missing '{required}')"
                )));
            }
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for row in rdr.deserialize::<CatalogRow>() {
            let row = row?;
            let parsed = match (row.word, row.class, row.level) {
                (Some(word), Some(class), Some(level)) if !word.is_empty() && !class.is_empty() => {
                    level.parse::<Level>().ok().map(|l| WordEntry::new(&word, &class, l))
                }
                _ => None,
            };
            match parsed {
                Some(entry) if seen.insert(entry.key()) => entries.push(entry),
                Some(_) => {}
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped = skipped, "Dropped malformed word list rows");
        }
        if entries.is_empty() {
            return Err(VocabError::Data("word list contains no usable entries".to_string()));
        }

        info!(words = entries.len(), "Loaded word list");
        Ok(Self { entries })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            VocabError::Data(format!("cannot open word list {}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(file)
    }

    /// The word list shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_reader(BUILTIN_WORDS.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    /// Words of `level`, or every word when `level` is `None`.
    pub fn words(&self, level: Option<Level>) -> Vec<WordEntry> {
        self.entries
            .iter()
            .filter(|e| level.map_or(true, |l| e.level == l))
            .cloned()
            .collect()
    }

    pub fn words_in(&self, levels: &[Level]) -> Vec<WordEntry> {
        self.entries
            .iter()
            .filter(|e| levels.contains(&e.level))
            .cloned()
            .collect()
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_list_covers_every_level() {
        let pool = WordPool::builtin().unwrap();
        for level in Level::ALL {
            assert!(pool.count(level) > 0, "no words for {level}");
        }
    }

    #[test]
    fn rows_are_normalized_and_filtered() {
        let csv = "word,class,level\n  House ,Noun,A1\nship,noun,b1\nbroken,noun,z9\n,noun,a1\nhouse,noun,a1\n";
        let pool = WordPool::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.entries()[0], WordEntry::new("house", "noun", Level::A1));
        assert_eq!(pool.words(Some(Level::B1)).len(), 1);
        assert_eq!(pool.words(None).len(), 2);
    }

    #[test]
    fn missing_columns_are_a_data_error() {
        let err = WordPool::from_reader("word,level\nhouse,a1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, VocabError::Data(_)));
    }

    #[test]
    fn list_without_usable_rows_is_a_data_error() {
        let err = WordPool::from_reader("word,class,level\nx,noun,q7\n".as_bytes()).unwrap_err();
        assert!(matches!(err, VocabError::Data(_)));
    }

    #[test]
    fn words_in_filters_by_level_set() {
        let pool = WordPool::builtin().unwrap();
        let easy = pool.words_in(&[Level::A1, Level::A2]);
        assert!(easy.iter().all(|e| e.level <= Level::A2));
        assert_eq!(easy.len(), pool.count(Level::A1) + pool.count(Level::A2));
    }
}
