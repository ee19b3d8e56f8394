use crate::candidate::{AlignedPhrase, PhraseSpan};
use crate::phrase_table::{phrase_pair_key, PhraseTable};
use crate::sparse::SparseVector;

use super::filter::InformativenessFilter;

/// Membership gate for phrase pairs: the static table plus pairs that were
/// added for the examples seen so far.
pub(super) struct PairGate<'a> {
    pub table: Option<&'a dyn PhraseTable>,
    pub extra: &'a dyn PhraseTable,
}

impl PairGate<'_> {
    fn admits(&self, source: &str, target: &str) -> bool {
        match self.table {
            None => true,
            Some(table) => {
                let pair = phrase_pair_key(source, target);
                table.includes(&pair) || self.extra.includes(&pair)
            }
        }
    }
}

/// Feature name and weight for one aligned phrase, or `None` when the span
/// is unusable or the pair is not admitted.
fn phrase_pair_feature(
    aligned: &AlignedPhrase,
    source_tokens: &[&str],
    gate: &PairGate<'_>,
) -> Option<(String, f64)> {
    let target = aligned.phrase.as_str();
    match aligned.span.collapsed() {
        PhraseSpan::Unaligned => None,
        PhraseSpan::Range(i, j) => {
            if i > j || j >= source_tokens.len() {
                return None;
            }
            let src = &source_tokens[i..=j];
            if !gate.admits(&src.join(" "), target) {
                return None;
            }
            let tgt: Vec<&str> = target.split_whitespace().collect();
            let name = format!("PP:{}~{}", src.join(","), tgt.join(","));
            Some((name, src.len() as f64))
        }
        PhraseSpan::Single(i) => {
            let src = source_tokens.get(i)?;
            if !gate.admits(src, target) {
                return None;
            }
            Some((format!("PP:{src}~{target}"), 1.0))
        }
    }
}

/// Emit `PP:` features for every aligned phrase of a candidate. A later
/// phrase producing the same name overwrites the earlier weight.
pub(super) fn extract_phrase_pairs(
    f: &mut SparseVector,
    aligned: &[AlignedPhrase],
    source_tokens: &[&str],
    gate: &PairGate<'_>,
    binary: bool,
    filter: Option<&InformativenessFilter>,
) {
    for a in aligned {
        if let Some(flt) = filter {
            let target_tokens: Vec<&str> = a.phrase.split_whitespace().collect();
            if flt.rejects(&target_tokens) {
                continue;
            }
        }
        if let Some((name, weight)) = phrase_pair_feature(a, source_tokens, gate) {
            f.set(name, if binary { 1.0 } else { weight });
        }
    }
}
