//! Online perceptron updates over sparse feature vectors.
//!
//! The model is a single [`SparseVector`] owned by the caller and passed
//! by `&mut` into every update, so its evolution across examples and
//! iterations is explicit.

mod trainer;

pub use trainer::{Example, ExampleOutcome, IterationReport, TrainOptions, Trainer};

use std::fmt;
use std::str::FromStr;

use crate::candidate::Candidate;
use crate::sparse::SparseVector;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown update rule '{0}' (expected 'structured' or 'ranking')")]
pub struct UnknownUpdateRule(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRule {
    /// Correct whenever the hypothesis differs from the oracle.
    Structured,
    /// Correct only when the oracle does not strictly outscore the hypothesis.
    Ranking,
}

impl UpdateRule {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateRule::Structured => "structured",
            UpdateRule::Ranking => "ranking",
        }
    }

    /// Apply the rule, returning whether the model was corrected.
    pub fn apply(
        self,
        model: &mut SparseVector,
        hypothesis: &Candidate,
        oracle: &Candidate,
        learning_rate: f64,
    ) -> bool {
        match self {
            UpdateRule::Structured => structured_update(model, hypothesis, oracle, learning_rate),
            UpdateRule::Ranking => ranking_update(model, hypothesis, oracle, learning_rate),
        }
    }
}

impl FromStr for UpdateRule {
    type Err = UnknownUpdateRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structured" => Ok(UpdateRule::Structured),
            "ranking" => Ok(UpdateRule::Ranking),
            other => Err(UnknownUpdateRule(other.to_string())),
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `model += (oracle - hypothesis) * learning_rate`
fn correct(
    model: &mut SparseVector,
    hypothesis: &Candidate,
    oracle: &Candidate,
    learning_rate: f64,
) {
    let diff = &oracle.features - &hypothesis.features;
    model.add_scaled(&diff, learning_rate);
}

pub fn structured_update(
    model: &mut SparseVector,
    hypothesis: &Candidate,
    oracle: &Candidate,
    learning_rate: f64,
) -> bool {
    if hypothesis.surface == oracle.surface {
        return false;
    }
    correct(model, hypothesis, oracle, learning_rate);
    true
}

pub fn ranking_update(
    model: &mut SparseVector,
    hypothesis: &Candidate,
    oracle: &Candidate,
    learning_rate: f64,
) -> bool {
    if oracle.score_or_min() > hypothesis.score_or_min() || hypothesis.surface == oracle.surface {
        return false;
    }
    correct(model, hypothesis, oracle, learning_rate);
    true
}

/// Score every candidate against `model`.
pub fn score_all(candidates: &mut [Candidate], model: &SparseVector) {
    for c in candidates.iter_mut() {
        c.rescore(model);
    }
}

/// Index of the highest-scoring candidate; ties go to the earliest entry.
/// `None` for an empty list.
pub fn best_index(candidates: &[Candidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        let s = c.score_or_min();
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests;
