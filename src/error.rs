use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize/deserialize data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to read word list: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Word data error: {0}")]
    Data(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Cannot select a word: {0}")]
    Selection(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl VocabError {
    /// Errors the quiz loop can absorb without ending the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VocabError::Translation(_) | VocabError::Persistence(_) | VocabError::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VocabError>;
