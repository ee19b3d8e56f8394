//! Readers for the training inputs: source sentences, Moses k-best lists,
//! oracle annotations and additional phrase pairs.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::candidate::Candidate;
use crate::learner::Example;
use crate::phrase_table::phrase_pair_key;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{what} has {found} entries, expected {expected}")]
    Mismatch {
        what: &'static str,
        found: usize,
        expected: usize,
    },
}

fn open(path: &Path) -> Result<BufReader<fs::File>, CorpusError> {
    fs::File::open(path)
        .map(BufReader::new)
        .map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn lines_of<R: BufRead>(reader: R, path: &Path) -> Result<Vec<String>, CorpusError> {
    reader
        .lines()
        .map(|l| {
            l.map(|s| s.trim_end_matches('\r').to_string())
                .map_err(|source| CorpusError::Io {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect()
}

/// All lines of a file, line terminators removed.
pub fn read_lines(path: &Path) -> Result<Vec<String>, CorpusError> {
    lines_of(open(path)?, path)
}

/// A parsed k-best entry: example index plus candidate.
fn parse_kbest_line(line: &str) -> Result<(usize, Candidate), String> {
    let fields: Vec<&str> = line.split("|||").collect();
    if fields.len() < 2 {
        return Err("expected 'id ||| translation ||| ...'".to_string());
    }
    let id: usize = fields[0]
        .trim()
        .parse()
        .map_err(|_| format!("invalid example id '{}'", fields[0].trim()))?;
    let mut candidate = Candidate::hypothesis(fields[1]);
    if let Some(score) = fields.get(3) {
        let score: f64 = score
            .trim()
            .parse()
            .map_err(|_| format!("invalid decoder score '{}'", score.trim()))?;
        candidate = candidate.with_decoder_score(score);
    }
    Ok((id, candidate))
}

/// Read Moses n-best output (`id ||| translation ||| features ||| score`),
/// one list per example id. Ids must be non-decreasing and below
/// `examples`; skipped ids yield empty lists. Entries keep file order within
/// a list.
pub fn read_kbest_lists(
    path: &Path,
    examples: usize,
) -> Result<Vec<Vec<Candidate>>, CorpusError> {
    parse_kbest_lists(open(path)?, path, examples)
}

pub fn parse_kbest_lists<R: BufRead>(
    reader: R,
    path: &Path,
    examples: usize,
) -> Result<Vec<Vec<Candidate>>, CorpusError> {
    let mut lists: Vec<Vec<Candidate>> = Vec::new();
    for (n, line) in lines_of(reader, path)?.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parse_err = |reason: String| CorpusError::Parse {
            path: path.to_path_buf(),
            line: n + 1,
            reason,
        };
        let (id, candidate) = parse_kbest_line(&line).map_err(parse_err)?;
        if id >= examples {
            return Err(parse_err(format!(
                "example id {id} out of range ({examples} examples)"
            )));
        }
        if id + 1 < lists.len() {
            return Err(parse_err(format!(
                "example id {id} after id {}; ids must be non-decreasing",
                lists.len() - 1
            )));
        }
        if lists.len() <= id {
            lists.resize_with(id + 1, Vec::new);
        }
        lists[id].push(candidate);
    }
    Ok(lists)
}

/// Per-example phrase pairs admitted in addition to the phrase table,
/// keyed by 0-based example index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalPhrasePairs {
    by_example: HashMap<usize, Vec<String>>,
}

impl AdditionalPhrasePairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, pair: impl Into<String>) {
        self.by_example.entry(index).or_default().push(pair.into());
    }

    pub fn get(&self, index: usize) -> Option<&[String]> {
        self.by_example.get(&index).map(Vec::as_slice)
    }

    /// Number of examples with at least one pair.
    pub fn len(&self) -> usize {
        self.by_example.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_example.is_empty()
    }

    /// Parse lines of `<1-based index> <source> ||| <target> ||| <extra>`.
    pub fn from_reader<R: BufRead>(reader: R, path: &Path) -> Result<Self, CorpusError> {
        let mut out = Self::new();
        for (n, line) in lines_of(reader, path)?.into_iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parse_err = |reason: String| CorpusError::Parse {
                path: path.to_path_buf(),
                line: n + 1,
                reason,
            };
            let (id, pair) = line
                .trim_start()
                .split_once(char::is_whitespace)
                .ok_or_else(|| parse_err("expected '<index> <source> ||| <target>'".into()))?;
            let id: usize = id
                .parse()
                .ok()
                .filter(|&i| i >= 1)
                .ok_or_else(|| parse_err(format!("invalid 1-based example index '{id}'")))?;
            let mut fields = pair.split("|||");
            let (Some(src), Some(tgt)) = (fields.next(), fields.next()) else {
                return Err(parse_err("missing '|||' between source and target".into()));
            };
            out.insert(id - 1, phrase_pair_key(src, tgt));
        }
        Ok(out)
    }

    pub fn open(path: &Path) -> Result<Self, CorpusError> {
        Self::from_reader(open(path)?, path)
    }
}

/// Zip sources, oracle lines and k-best lists into examples.
///
/// Sources and oracles must have the same length; k-best lists may be
/// shorter (trailing examples get empty lists) but not longer.
pub fn assemble_examples(
    sources: Vec<String>,
    oracles: Vec<String>,
    mut kbest_lists: Vec<Vec<Candidate>>,
) -> Result<Vec<Example>, CorpusError> {
    if oracles.len() != sources.len() {
        return Err(CorpusError::Mismatch {
            what: "oracles",
            found: oracles.len(),
            expected: sources.len(),
        });
    }
    if kbest_lists.len() > sources.len() {
        return Err(CorpusError::Mismatch {
            what: "k-best lists",
            found: kbest_lists.len(),
            expected: sources.len(),
        });
    }
    kbest_lists.resize_with(sources.len(), Vec::new);
    let empty = kbest_lists.iter().filter(|l| l.is_empty()).count();
    if empty > 0 {
        warn!(empty, "examples without k-best entries");
    }
    Ok(sources
        .into_iter()
        .zip(oracles)
        .zip(kbest_lists)
        .map(|((source, oracle), kbest)| Example {
            source: source.trim().to_string(),
            kbest,
            oracle: Candidate::oracle(&oracle),
        })
        .collect())
}

/// Read and assemble the three input files.
pub fn load_examples(
    sources: &Path,
    oracles: &Path,
    kbest_lists: &Path,
) -> Result<Vec<Example>, CorpusError> {
    let sources = read_lines(sources)?;
    let oracles = read_lines(oracles)?;
    let kbest_lists = read_kbest_lists(kbest_lists, sources.len())?;
    let examples = assemble_examples(sources, oracles, kbest_lists)?;
    debug!(examples = examples.len(), "loaded corpus");
    Ok(examples)
}
