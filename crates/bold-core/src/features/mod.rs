//! Sparse feature extraction for translation candidates.
//!
//! Two feature families are produced:
//!
//! - **Phrase pairs** (`PP:`): one feature per aligned (source span, target
//!   phrase), optionally gated by a phrase table
//! - **Target n-grams** (`NG:`): windows over the candidate's tokens
//!
//! Both can be passed through an informativeness filter that drops
//! all-single-character, all-stopword and all-numeric token sequences.

mod filter;
mod ngram;
mod phrase_pair;

pub use filter::InformativenessFilter;

use std::io;
use std::path::PathBuf;

use tracing::{debug, debug_span};

use crate::candidate::Candidate;
use crate::phrase_table::{load_phrase_table, PhraseTable, PhraseTableError};
use crate::sparse::SparseVector;

use ngram::extract_ngrams;
use phrase_pair::{extract_phrase_pairs, PairGate};

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("phrase table {path}: {source}")]
    PhraseTable {
        path: PathBuf,
        source: PhraseTableError,
    },
    #[error("stopword list {path}: {source}")]
    Stopwords { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramOptions {
    pub n: usize,
    /// Only full-length windows.
    pub fix: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhrasePairOptions {
    /// Emit a pair only if this table (or the per-example extras) knows it.
    pub table: Option<PathBuf>,
}

/// What to extract. Fixed for the lifetime of a [`FeatureFactory`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureConfig {
    pub target_ngrams: Option<NgramOptions>,
    pub phrase_pairs: Option<PhrasePairOptions>,
    /// All weights 1.0 instead of span / window length.
    pub binary: bool,
    /// Stopword list enabling the informativeness filter.
    pub stopwords: Option<PathBuf>,
}

pub struct FeatureFactory {
    ngrams: Option<NgramOptions>,
    phrase_pairs: bool,
    binary: bool,
    table: Option<Box<dyn PhraseTable>>,
    filter: Option<InformativenessFilter>,
}

impl FeatureFactory {
    /// Factory without a phrase table or filter; see [`Self::with_phrase_table`]
    /// and [`Self::with_filter`].
    pub fn new(config: &FeatureConfig) -> Self {
        Self {
            ngrams: config.target_ngrams,
            phrase_pairs: config.phrase_pairs.is_some(),
            binary: config.binary,
            table: None,
            filter: None,
        }
    }

    /// Build a factory, loading the phrase table and stopword list named in
    /// `config`.
    pub fn from_config(config: &FeatureConfig) -> Result<Self, FeatureError> {
        let mut factory = Self::new(config);
        if let Some(path) = config.phrase_pairs.as_ref().and_then(|p| p.table.as_ref()) {
            let table = load_phrase_table(path).map_err(|source| FeatureError::PhraseTable {
                path: path.clone(),
                source,
            })?;
            factory.table = Some(table);
        }
        if let Some(path) = &config.stopwords {
            let filter =
                InformativenessFilter::open(path).map_err(|source| FeatureError::Stopwords {
                    path: path.clone(),
                    source,
                })?;
            debug!(stopwords = filter.stopword_count(), "loaded stopword list");
            factory.filter = Some(filter);
        }
        Ok(factory)
    }

    pub fn with_phrase_table(mut self, table: Box<dyn PhraseTable>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_filter(mut self, filter: InformativenessFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn has_phrase_table(&self) -> bool {
        self.table.is_some()
    }

    /// Extract the feature vector of `candidate` translated from `source`.
    ///
    /// `extra` holds phrase pairs accepted in addition to the phrase table;
    /// it is ignored when no table is configured.
    pub fn produce(
        &self,
        candidate: &Candidate,
        source: &str,
        extra: &dyn PhraseTable,
    ) -> SparseVector {
        let _span = debug_span!("produce", kind = ?candidate.kind).entered();
        let mut f = SparseVector::new();
        if self.phrase_pairs {
            let source_tokens: Vec<&str> = source.split_whitespace().collect();
            let gate = PairGate {
                table: self.table.as_deref(),
                extra,
            };
            extract_phrase_pairs(
                &mut f,
                &candidate.aligned_phrases(),
                &source_tokens,
                &gate,
                self.binary,
                self.filter.as_ref(),
            );
        }
        if let Some(opts) = self.ngrams {
            extract_ngrams(
                &mut f,
                &candidate.tokens(),
                opts.n,
                opts.fix,
                self.binary,
                self.filter.as_ref(),
            );
        }
        f
    }
}
