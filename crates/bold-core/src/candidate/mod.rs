//! Translation hypotheses and oracles.
//!
//! Both share one shape: a surface string, the raw annotated form it was
//! derived from, a feature vector and a score. They differ only in how
//! the raw line is parsed.

mod alignment;

pub use alignment::{parse_alignment, strip_alignment, AlignedPhrase, PhraseSpan};

use crate::sparse::SparseVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// Entry of a decoder k-best list.
    Hypothesis,
    /// Constrained-search reference.
    Oracle,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Plain translation with alignment markers removed.
    pub surface: String,
    /// Translation with alignment markers.
    pub raw: String,
    pub features: SparseVector,
    /// Model score; `None` until scored.
    pub score: Option<f64>,
    /// Score assigned by the decoder, when the input carries one.
    pub decoder_score: Option<f64>,
}

impl Candidate {
    /// Build a k-best entry from its annotated translation.
    pub fn hypothesis(raw: &str) -> Self {
        Self::from_raw(CandidateKind::Hypothesis, raw.trim().to_string())
    }

    /// Build an oracle from a `<prefix> : <annotation>` line whose spans are
    /// bracketed (`[0-1]`) rather than piped.
    pub fn oracle(line: &str) -> Self {
        let annotation = line
            .trim()
            .split_once(" : ")
            .map(|(_, rest)| rest)
            .unwrap_or("");
        let raw = annotation.replace(['[', ']'], "|");
        Self::from_raw(CandidateKind::Oracle, raw)
    }

    fn from_raw(kind: CandidateKind, raw: String) -> Self {
        Self {
            kind,
            surface: strip_alignment(&raw),
            raw,
            features: SparseVector::new(),
            score: None,
            decoder_score: None,
        }
    }

    pub fn with_decoder_score(mut self, score: f64) -> Self {
        self.decoder_score = Some(score);
        self
    }

    /// Target phrases paired with their source spans.
    pub fn aligned_phrases(&self) -> Vec<AlignedPhrase> {
        parse_alignment(&self.raw)
    }

    pub fn phrases(&self) -> Vec<String> {
        self.aligned_phrases().into_iter().map(|a| a.phrase).collect()
    }

    pub fn spans(&self) -> Vec<PhraseSpan> {
        self.aligned_phrases().into_iter().map(|a| a.span).collect()
    }

    pub fn tokens(&self) -> Vec<&str> {
        self.surface.split_whitespace().collect()
    }

    /// Score against `model`, store and return it.
    pub fn rescore(&mut self, model: &SparseVector) -> f64 {
        let s = model.dot(&self.features);
        self.score = Some(s);
        s
    }

    /// Score for comparisons; unscored candidates rank below everything.
    pub fn score_or_min(&self) -> f64 {
        self.score.unwrap_or(f64::NEG_INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hypothesis_surface() {
        let c = Candidate::hypothesis(" le chat |0-1| est assis |2-3| ");
        assert_eq!(c.kind, CandidateKind::Hypothesis);
        assert_eq!(c.surface, "le chat est assis");
        assert_eq!(c.raw, "le chat |0-1| est assis |2-3|");
        assert_eq!(c.tokens(), vec!["le", "chat", "est", "assis"]);
        assert!(c.score.is_none());
    }

    #[test]
    fn test_oracle_brackets() {
        let o = Candidate::oracle("0 ||| 1.5 : le chat [0-1] est assis [2-3]\n");
        assert_eq!(o.kind, CandidateKind::Oracle);
        assert_eq!(o.surface, "le chat est assis");
        assert_eq!(
            o.spans(),
            vec![PhraseSpan::Range(0, 1), PhraseSpan::Range(2, 3)]
        );
        assert_eq!(o.phrases(), vec!["le chat", "est assis"]);
    }

    #[test]
    fn test_oracle_without_separator_is_empty() {
        let o = Candidate::oracle("garbage");
        assert_eq!(o.surface, "");
        assert!(o.aligned_phrases().is_empty());
    }

    #[test]
    fn test_unscored_ranks_lowest() {
        let mut c = Candidate::hypothesis("a |0|");
        assert_eq!(c.score_or_min(), f64::NEG_INFINITY);
        let mut model = SparseVector::new();
        model.set("x", 2.0);
        c.features.set("x", 1.5);
        assert_eq!(c.rescore(&model), 3.0);
        assert_eq!(c.score, Some(3.0));
    }
}
