use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::WeightConfig;
use crate::error::{Result, VocabError};
use crate::types::WordEntry;
use crate::weights::WeightTable;

/// Picks the next word by sampling proportionally to each candidate's weight.
/// Deterministic for a given random source, pool and weights.
#[derive(Debug)]
pub struct WeightedSelector<R: Rng = StdRng> {
    rng: R,
    exclude_recent: usize,
}

impl WeightedSelector<StdRng> {
    pub fn from_entropy(exclude_recent: usize) -> Self {
        Self::new(StdRng::from_entropy(), exclude_recent)
    }

    pub fn seeded(seed: u64, exclude_recent: usize) -> Self {
        Self::new(StdRng::seed_from_u64(seed), exclude_recent)
    }
}

impl<R: Rng> WeightedSelector<R> {
    pub fn new(rng: R, exclude_recent: usize) -> Self {
        Self { rng, exclude_recent }
    }

    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// `recent` holds word keys, newest first. The newest `exclude_recent` of
    /// them are left out unless that would empty the candidate set.
    pub fn select<'a>(
        &mut self,
        pool: &'a [WordEntry],
        weights: &WeightTable,
        recent: &[String],
        now: DateTime<Utc>,
        cfg: &WeightConfig,
    ) -> Result<&'a WordEntry> {
        if pool.is_empty() {
            return Err(VocabError::Selection("word pool is empty".to_string()));
        }

        let excluded: Vec<&String> = recent.iter().take(self.exclude_recent).collect();
        let mut candidates: Vec<&WordEntry> = pool
            .iter()
            .filter(|e| !excluded.contains(&&e.key()))
            .collect();
        if candidates.is_empty() {
            debug!(pool = pool.len(), "Recent-word exclusion would empty the pool, skipping it");
            candidates = pool.iter().collect();
        }

        let candidate_weights: Vec<f64> = candidates
            .iter()
            .map(|e| weights.weight_for(e, now, cfg))
            .collect();

        let dist = WeightedIndex::new(&candidate_weights)
            .map_err(|e| VocabError::Selection(format!("invalid candidate weights: {e}")))?;
        let picked = candidates[dist.sample(&mut self.rng)];

        debug!(
            word = %picked.word,
            level = %picked.level,
            candidates = candidates.len(),
            "Selected next word"
        );
        Ok(picked)
    }
}
