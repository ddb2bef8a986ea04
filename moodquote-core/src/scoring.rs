//! Weighted multi-field scoring of an actual record against an expected one

use serde::{Deserialize, Serialize};

use crate::record::{Field, RecordFields};
use crate::similarity::string_similarity;

/// Per-field similarities and their weighted composite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub mood_score: f64,
    pub quote_score: f64,
    pub author_score: f64,
    pub action_score: f64,
    pub overall_score: f64,
}

/// Field weights for the composite score. Quote fidelity matters most.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub mood: f64,
    pub quote: f64,
    pub author: f64,
    pub action: f64,
}

impl ScoreWeights {
    pub const STANDARD: ScoreWeights = ScoreWeights {
        mood: 0.25,
        quote: 0.45,
        author: 0.15,
        action: 0.15,
    };

    /// Weight-normalized composite, so uniform inputs map to themselves exactly
    pub fn composite(&self, mood: f64, quote: f64, author: f64, action: f64) -> f64 {
        let total_weight = self.mood + self.quote + self.author + self.action;
        if total_weight == 0.0 {
            return 0.0;
        }

        (self.mood * mood + self.quote * quote + self.author * author + self.action * action)
            / total_weight
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Similarity of one field; a missing field compares as an empty string
pub fn field_similarity<E, A>(expected: &E, actual: &A, field: Field) -> f64
where
    E: RecordFields + ?Sized,
    A: RecordFields + ?Sized,
{
    string_similarity(
        expected.field(field).unwrap_or(""),
        actual.field(field).unwrap_or(""),
    )
}

/// Score with the standard weights
pub fn score<E, A>(expected: &E, actual: &A) -> ScoreReport
where
    E: RecordFields + ?Sized,
    A: RecordFields + ?Sized,
{
    score_weighted(expected, actual, &ScoreWeights::STANDARD)
}

/// Score with custom weights
pub fn score_weighted<E, A>(expected: &E, actual: &A, weights: &ScoreWeights) -> ScoreReport
where
    E: RecordFields + ?Sized,
    A: RecordFields + ?Sized,
{
    let mood_score = field_similarity(expected, actual, Field::Mood);
    let quote_score = field_similarity(expected, actual, Field::Quote);
    let author_score = field_similarity(expected, actual, Field::Author);
    let action_score = field_similarity(expected, actual, Field::SuggestedAction);

    ScoreReport {
        mood_score,
        quote_score,
        author_score,
        action_score,
        overall_score: weights.composite(mood_score, quote_score, author_score, action_score),
    }
}
