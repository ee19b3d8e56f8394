use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Rejects token sequences that carry no lexical information: all
/// single-character, all stopwords, or all digits.
#[derive(Debug, Clone, Default)]
pub struct InformativenessFilter {
    stopwords: HashSet<String>,
}

impl InformativenessFilter {
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Load a stopword list, one word per line.
    pub fn open(path: &Path) -> Result<Self, io::Error> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(text.lines()))
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// True when `tokens` should be suppressed. An empty sequence is rejected.
    pub fn rejects(&self, tokens: &[&str]) -> bool {
        let single_char = tokens.iter().all(|t| t.chars().count() <= 1);
        let only_stop = tokens
            .iter()
            .all(|t| self.stopwords.contains(&t.to_lowercase()));
        let only_num = tokens
            .iter()
            .all(|t| t.chars().all(|c| c.is_ascii_digit()));
        single_char || only_stop || only_num
    }
}
