//! Mock model: picks a quote from a fixed database instead of calling an API
//!
//! The sampling knobs mimic their LLM counterparts only loosely. `top_k`
//! randomly samples the candidate pool down to `k` entries, `top_p` keeps a
//! size-proportional prefix of whatever pool remains, and `temperature` only
//! switches between "first candidate" and "uniformly random candidate".

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::record::QuoteEntry;

pub const FALLBACK_QUOTE: &str = "Keep going, you're doing better than you think.";
pub const FALLBACK_AUTHOR: &str = "AI Coach";
pub const FALLBACK_ACTION: &str = "Pause and breathe.";

/// Generation-style parameters for the mock model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default)]
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl SamplingParams {
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Record returned when there is nothing to choose from
pub fn fallback_entry(mood: &str) -> QuoteEntry {
    QuoteEntry::new(mood, FALLBACK_QUOTE)
        .with_author(FALLBACK_AUTHOR)
        .with_action(FALLBACK_ACTION)
}

/// Entries whose mood occurs in the (lower-cased) input
pub fn matching_entries<'a>(mood: &str, database: &'a [QuoteEntry]) -> Vec<&'a QuoteEntry> {
    let input = mood.to_lowercase();
    database
        .iter()
        .filter(|entry| input.contains(&entry.mood.to_lowercase()))
        .collect()
}

/// Build the candidate pool: matches (or the whole database), then `top_k`, then `top_p`
pub fn candidate_pool<'a, R: Rng + ?Sized>(
    mood: &str,
    database: &'a [QuoteEntry],
    params: &SamplingParams,
    rng: &mut R,
) -> Vec<&'a QuoteEntry> {
    let matches = matching_entries(mood, database);
    let mut pool = if matches.is_empty() {
        database.iter().collect()
    } else {
        matches
    };

    if let Some(k) = params.top_k.filter(|&k| k > 0) {
        if pool.len() > k {
            pool = pool.choose_multiple(rng, k).copied().collect();
        }
    }

    match params.top_p {
        Some(p) if p > 0.0 && p < 1.0 => {
            if !pool.is_empty() {
                let keep = ((pool.len() as f64 * p).ceil() as usize).max(1);
                pool.truncate(keep);
            }
        }
        Some(p) => tracing::debug!("Ignoring top_p={} outside (0, 1)", p),
        None => {}
    }

    pool
}

/// Pick from a fixed pool; the first entry when `temperature <= 0`
pub fn pick<R: Rng + ?Sized>(
    mood: &str,
    pool: &[&QuoteEntry],
    temperature: f64,
    rng: &mut R,
) -> QuoteEntry {
    let chosen = if temperature <= 0.0 {
        pool.first()
    } else {
        pool.choose(rng)
    };

    chosen
        .map(|entry| (*entry).clone())
        .unwrap_or_else(|| fallback_entry(mood))
}

/// Stand-in model used for offline evaluation
pub struct MockModel {
    database: Vec<QuoteEntry>,
    params: SamplingParams,
    rng: StdRng,
}

impl MockModel {
    pub fn new(database: Vec<QuoteEntry>, params: SamplingParams) -> Self {
        Self {
            database,
            params,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    pub fn database(&self) -> &[QuoteEntry] {
        &self.database
    }

    /// Answer for one mood
    pub fn respond(&mut self, mood: &str) -> QuoteEntry {
        let pool = candidate_pool(mood, &self.database, &self.params, &mut self.rng);
        tracing::debug!("Mock pool for {:?}: {} candidate(s)", mood, pool.len());
        pick(mood, &pool, self.params.temperature, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> Vec<QuoteEntry> {
        vec![
            QuoteEntry::new("tired", "Rest is part of the work.").with_author("A"),
            QuoteEntry::new("sad", "This too shall pass.").with_author("B"),
            QuoteEntry::new("happy", "Share the joy.").with_author("C"),
        ]
    }

    #[test]
    fn test_matches_by_substring() {
        let db = database();
        let matches = matching_entries("Really TIRED today", &db);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].mood, "tired");
    }

    #[test]
    fn test_no_match_uses_whole_database() {
        let db = database();
        let mut rng = StdRng::seed_from_u64(7);
        let pool = candidate_pool("anxious", &db, &SamplingParams::default(), &mut rng);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool[0].mood, "tired");
    }

    #[test]
    fn test_top_p_prefix() {
        let db = database();
        let mut rng = StdRng::seed_from_u64(7);
        let params = SamplingParams::default().with_top_p(0.5);
        let pool = candidate_pool("anxious", &db, &params, &mut rng);
        // ceil(3 * 0.5) = 2, in database order
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].mood, "tired");
        assert_eq!(pool[1].mood, "sad");

        let tiny = SamplingParams::default().with_top_p(0.01);
        assert_eq!(candidate_pool("anxious", &db, &tiny, &mut rng).len(), 1);
    }

    #[test]
    fn test_out_of_range_top_p_is_ignored() {
        let db = database();
        let mut rng = StdRng::seed_from_u64(7);
        let params = SamplingParams::default().with_top_p(1.5);
        assert_eq!(candidate_pool("anxious", &db, &params, &mut rng).len(), 3);
    }

    #[test]
    fn test_zero_top_k_is_ignored() {
        let db = database();
        let mut rng = StdRng::seed_from_u64(7);
        let params = SamplingParams::default().with_top_k(0);
        assert_eq!(candidate_pool("anxious", &db, &params, &mut rng).len(), 3);
    }

    #[test]
    fn test_empty_database_falls_back() {
        let mut model = MockModel::new(Vec::new(), SamplingParams::default().with_temperature(0.9))
            .with_seed(1);
        let answer = model.respond("gloomy");
        assert_eq!(answer, fallback_entry("gloomy"));
        assert_eq!(answer.author.as_deref(), Some("AI Coach"));
    }

    #[test]
    fn test_deterministic_at_zero_temperature() {
        let mut model = MockModel::new(database(), SamplingParams::default()).with_seed(3);
        for _ in 0..5 {
            assert_eq!(model.respond("sad and tired").mood, "tired");
        }
    }

    #[test]
    fn test_random_pick_stays_in_pool() {
        let mut model =
            MockModel::new(database(), SamplingParams::default().with_temperature(1.0)).with_seed(11);
        for _ in 0..20 {
            let answer = model.respond("sad and tired");
            assert!(answer.mood == "sad" || answer.mood == "tired");
        }
    }
}
