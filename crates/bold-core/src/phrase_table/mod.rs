//! Phrase-pair membership tables.
//!
//! A phrase pair is the string `"<source phrase> ||| <target phrase>"`.
//! Tables only answer membership; a table may report false positives but
//! never false negatives.

mod bloom;

pub use bloom::BloomPhraseTable;

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PhraseTableError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected BDPT)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch")]
    Checksum,

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub trait PhraseTable: Send + Sync {
    fn includes(&self, pair: &str) -> bool;
}

/// Format a phrase pair the way tables store it.
pub fn phrase_pair_key(source: &str, target: &str) -> String {
    format!("{} ||| {}", source.trim(), target.trim())
}

/// Extract the pair key from a Moses phrase-table line
/// (`src ||| tgt ||| scores ...`).
pub fn phrase_pair_from_line(line: &str) -> Option<String> {
    let mut fields = line.split("|||");
    let src = fields.next()?;
    let tgt = fields.next()?;
    if src.trim().is_empty() || tgt.trim().is_empty() {
        return None;
    }
    Some(phrase_pair_key(src, tgt))
}

/// Exact in-memory set.
#[derive(Debug, Clone, Default)]
pub struct ExactPhraseTable {
    pairs: HashSet<String>,
}

impl ExactPhraseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pair: impl Into<String>) {
        self.pairs.insert(pair.into());
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(String::as_str)
    }

    /// Read a Moses phrase table in text form. Lines without two fields are
    /// skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, PhraseTableError> {
        let mut table = Self::new();
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match phrase_pair_from_line(&line) {
                Some(pair) => table.insert(pair),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "phrase table lines without a source/target pair");
        }
        Ok(table)
    }

    pub fn open(path: &Path) -> Result<Self, PhraseTableError> {
        let file = fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl FromIterator<String> for ExactPhraseTable {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl PhraseTable for ExactPhraseTable {
    fn includes(&self, pair: &str) -> bool {
        self.pairs.contains(pair)
    }
}

/// Open a compiled bloom table if the file carries its magic, otherwise read
/// it as a text phrase table.
pub fn load_phrase_table(path: &Path) -> Result<Box<dyn PhraseTable>, PhraseTableError> {
    let bytes = fs::read(path)?;
    if bytes.starts_with(bloom::MAGIC) {
        let table = BloomPhraseTable::from_bytes(&bytes)?;
        debug!(path = %path.display(), items = table.item_count(), "loaded bloom phrase table");
        Ok(Box::new(table))
    } else {
        let table = ExactPhraseTable::from_reader(bytes.as_slice())?;
        debug!(path = %path.display(), pairs = table.len(), "loaded text phrase table");
        Ok(Box::new(table))
    }
}
