use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{RetryPolicy, TranslatorConfig};
use crate::error::{Result, VocabError};
use crate::fallback;
use crate::types::WordEntry;

const MAX_MEANINGS: usize = 10;

/// Source of translations for a catalog word.
pub trait Translate {
    fn translate(&self, entry: &WordEntry) -> impl Future<Output = Result<Vec<String>>>;
}

/// Runs `op` until it succeeds or the policy's attempts are used up, sleeping
/// `policy.delay_for(attempt)` between failures. Returns the last error.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(attempt = attempt + 1, max_attempts = attempts, error = %e, "Attempt failed");
                last_err = Some(e);
                if attempt + 1 < attempts {
                    let delay = policy.delay_for(attempt);
                    if !delay.is_zero() {
                        debug!(delay_ms = delay.as_millis() as u64, "Waiting before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| VocabError::Translation("no attempt was made".to_string())))
}

/// Splits a model reply into individual meanings: list markers and quotes
/// are stripped, duplicates and one-letter fragments dropped.
pub fn parse_meanings(response: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    response
        .split([',', ';', '|', '\n'])
        .map(clean_meaning)
        .filter(|m| m.chars().count() >= 2)
        .filter(|m| seen.insert(m.to_lowercase()))
        .take(MAX_MEANINGS)
        .collect()
}

fn clean_meaning(raw: &str) -> String {
    let mut text = raw.trim();
    loop {
        let before = text;
        text = text.trim_start_matches(['*', '-', '•']).trim_start();
        // "1." / "2)" numbering
        let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 && text[digits..].starts_with(['.', ')']) {
            text = text[digits + 1..].trim_start();
        }
        if text == before {
            break;
        }
    }
    text.trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c.is_whitespace())
        .to_string()
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Chat-completions client for the Groq API.
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    target_language: String,
    config: TranslatorConfig,
}

impl GroqClient {
    pub fn new(api_key: String, target_language: &str, config: TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("vocab-trainer v0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            target_language: target_language.to_string(),
            config,
        })
    }

    fn prompt(&self, entry: &WordEntry) -> String {
        format!(
            "Translate the English word \"{word}\" (as a {class}) into {lang}.\n\
             Provide all possible meanings in different contexts, separated by commas.\n\
             Return ONLY a list of {lang} meanings without explanation or additional text.\n\
             Focus on the most common and useful meanings.\n\n\
             Word: {word}\nClass: {class}\n{lang} meanings:",
            word = entry.word,
            class = entry.part_of_speech,
            lang = self.target_language,
        )
    }

    async fn request_once(&self, entry: &WordEntry) -> Result<Vec<String>> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: format!(
                        "You are a professional English-{} translator. Provide accurate, contextual translations without explanations.",
                        self.target_language
                    ),
                },
                ChatMessage {
                    role: "user",
                    content: self.prompt(entry),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| VocabError::Translation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VocabError::Translation(format!("service answered {status}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| VocabError::Translation(format!("unreadable response: {e}")))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let meanings = parse_meanings(&content);
        if meanings.is_empty() {
            return Err(VocabError::Translation(format!(
                "empty translation for '{}'",
                entry.word
            )));
        }
        Ok(meanings)
    }
}

impl Translate for GroqClient {
    async fn translate(&self, entry: &WordEntry) -> Result<Vec<String>> {
        info!(word = %entry.word, "Requesting translation");
        with_retry(&self.config.retry, |_| self.request_once(entry)).await
    }
}

/// Provider used when no API key is configured; every lookup falls through
/// to the fallback dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl Translate for Offline {
    async fn translate(&self, entry: &WordEntry) -> Result<Vec<String>> {
        Err(VocabError::Translation(format!(
            "no translation service configured for '{}'",
            entry.word
        )))
    }
}

/// Translations already fetched, keyed by `word_class`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationCache {
    entries: HashMap<String, Vec<String>>,
}

impl TranslationCache {
    pub fn key(entry: &WordEntry) -> String {
        format!("{}_{}", entry.word.to_lowercase(), entry.part_of_speech.to_lowercase())
    }

    pub fn get(&self, entry: &WordEntry) -> Option<&Vec<String>> {
        self.entries.get(&Self::key(entry))
    }

    pub fn insert(&mut self, entry: &WordEntry, meanings: Vec<String>) {
        self.entries.insert(Self::key(entry), meanings);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cache_size: self.len(),
            cached_words: self.keys(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cached_words: Vec<String>,
}

/// Cache, provider and fallback dictionary behind one call.
pub struct TranslationService<P: Translate> {
    provider: P,
    cache: TranslationCache,
    dirty: bool,
}

impl<P: Translate> TranslationService<P> {
    pub fn new(provider: P, cache: TranslationCache) -> Self {
        Self {
            provider,
            cache,
            dirty: false,
        }
    }

    /// Cached meanings, else the provider's, else the fallback dictionary's.
    /// Fails only when all three come up empty.
    pub async fn meanings_for(&mut self, entry: &WordEntry) -> Result<Vec<String>> {
        if let Some(cached) = self.cache.get(entry) {
            debug!(word = %entry.word, "Using cached translation");
            return Ok(cached.clone());
        }

        match self.provider.translate(entry).await {
            Ok(meanings) => {
                info!(word = %entry.word, count = meanings.len(), "Translated word");
                self.cache.insert(entry, meanings.clone());
                self.dirty = true;
                Ok(meanings)
            }
            Err(e) => match fallback::lookup(&entry.word) {
                Some(meanings) => {
                    warn!(word = %entry.word, error = %e, "Using fallback translation");
                    Ok(meanings)
                }
                None => {
                    warn!(word = %entry.word, error = %e, "No fallback translation available");
                    Err(e)
                }
            },
        }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// True when new translations were added since the last `mark_saved`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn clear_cache(&mut self) -> usize {
        let size = self.cache.len();
        self.cache.clear();
        self.dirty = true;
        info!(cleared = size, "Translation cache cleared");
        size
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
