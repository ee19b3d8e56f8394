//! Phrase-alignment markers embedded in decoder output.
//!
//! Moses writes `le chat |0-1| est assis |2-3|`: each target phrase is
//! followed by the source span it was translated from. `|-1|` marks a
//! phrase with no source side.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Source side of one aligned phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseSpan {
    /// Negative index in the annotation.
    Unaligned,
    Single(usize),
    /// Inclusive source range `[start, end]`.
    Range(usize, usize),
}

impl PhraseSpan {
    /// `Range(i, i)` becomes `Single(i)`.
    pub fn collapsed(self) -> Self {
        match self {
            PhraseSpan::Range(i, j) if i == j => PhraseSpan::Single(i),
            other => other,
        }
    }
}

/// A target phrase paired with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedPhrase {
    pub span: PhraseSpan,
    pub phrase: String,
}

/// `|-N|`, `|i|` or `|i-j|`.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|(?:(-[0-9]+)|([0-9]+)(?:-([0-9]+))?)\|").unwrap());

/// A marker located in the raw string: byte range plus parsed span.
struct Marker {
    start: usize,
    end: usize,
    span: PhraseSpan,
}

fn span_of(caps: &Captures<'_>) -> Option<PhraseSpan> {
    if caps.get(1).is_some() {
        return Some(PhraseSpan::Unaligned);
    }
    let first = caps.get(2)?.as_str().parse().ok()?;
    match caps.get(3) {
        Some(second) => Some(PhraseSpan::Range(first, second.as_str().parse().ok()?)),
        None => Some(PhraseSpan::Single(first)),
    }
}

/// Markers in order of appearance. Indices too large for `usize` are not
/// treated as markers.
fn markers(raw: &str) -> Vec<Marker> {
    MARKER
        .captures_iter(raw)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Marker {
                start: whole.start(),
                end: whole.end(),
                span: span_of(&caps)?,
            })
        })
        .collect()
}

/// Split an annotated string into (span, phrase) pairs.
///
/// Each marker is paired with the text preceding it. Pairs whose phrase
/// is blank are dropped, as is trailing text with no marker.
pub fn parse_alignment(raw: &str) -> Vec<AlignedPhrase> {
    let mut out = Vec::new();
    let mut prev_end = 0;
    for m in markers(raw) {
        let phrase = raw[prev_end..m.start].trim();
        prev_end = m.end;
        if phrase.is_empty() {
            continue;
        }
        out.push(AlignedPhrase {
            span: m.span,
            phrase: phrase.to_string(),
        });
    }
    out
}

/// Remove alignment markers and collapse whitespace.
pub fn strip_alignment(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut prev_end = 0;
    for m in markers(raw) {
        text.push_str(&raw[prev_end..m.start]);
        text.push(' ');
        prev_end = m.end;
    }
    text.push_str(&raw[prev_end..]);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
