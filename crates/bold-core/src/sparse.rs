//! Sparse feature vectors keyed by feature name.
//!
//! Absent keys are implicit zeros. Arithmetic that cancels a weight to
//! exactly `0.0` removes the key, so long training runs do not accumulate
//! dead entries.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SparseVector {
    weights: BTreeMap<String, f64>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of `name`, `0.0` when absent.
    pub fn get(&self, name: &str) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weights.contains_key(name)
    }

    /// Overwrite the weight of `name`.
    pub fn set(&mut self, name: impl Into<String>, weight: f64) {
        self.weights.insert(name.into(), weight);
    }

    /// Add `delta` to the weight of `name` (absent counts as zero).
    pub fn increment(&mut self, name: &str, delta: f64) {
        match self.weights.get_mut(name) {
            Some(w) => {
                *w += delta;
                if *w == 0.0 {
                    self.weights.remove(name);
                }
            }
            None => {
                if delta != 0.0 {
                    self.weights.insert(name.to_string(), delta);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        // Walk the smaller operand; keys missing from either side contribute 0.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .weights
            .iter()
            .filter_map(|(k, v)| large.weights.get(k).map(|w| v * w))
            .sum()
    }

    /// `self += other * factor`, in place.
    pub fn add_scaled(&mut self, other: &SparseVector, factor: f64) {
        for (name, w) in &other.weights {
            self.increment(name, w * factor);
        }
    }

    /// Multiply every weight by `factor`, dropping keys that become zero.
    pub fn scale(&mut self, factor: f64) {
        if factor == 0.0 {
            self.weights.clear();
            return;
        }
        for w in self.weights.values_mut() {
            *w *= factor;
        }
        self.weights.retain(|_, w| *w != 0.0);
    }

    /// Serialize to the textual model form: a JSON object with sorted keys.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        let mut v: SparseVector = serde_json::from_str(text)?;
        v.weights.retain(|_, w| *w != 0.0);
        Ok(v)
    }
}

impl FromIterator<(String, f64)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut v = SparseVector::new();
        for (k, w) in iter {
            v.increment(&k, w);
        }
        v
    }
}

impl AddAssign<&SparseVector> for SparseVector {
    fn add_assign(&mut self, rhs: &SparseVector) {
        self.add_scaled(rhs, 1.0);
    }
}

impl Add for &SparseVector {
    type Output = SparseVector;

    fn add(self, rhs: &SparseVector) -> SparseVector {
        let mut out = self.clone();
        out.add_scaled(rhs, 1.0);
        out
    }
}

impl Sub for &SparseVector {
    type Output = SparseVector;

    fn sub(self, rhs: &SparseVector) -> SparseVector {
        let mut out = self.clone();
        out.add_scaled(rhs, -1.0);
        out
    }
}

impl Mul<f64> for &SparseVector {
    type Output = SparseVector;

    fn mul(self, factor: f64) -> SparseVector {
        let mut out = self.clone();
        out.scale(factor);
        out
    }
}
