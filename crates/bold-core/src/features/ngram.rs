use crate::sparse::SparseVector;

use super::filter::InformativenessFilter;

/// Windows `(start, len)` over a sequence of `seq_len` tokens.
///
/// With `fix` only full windows of length `n` are produced. Otherwise
/// shorter windows are added where they touch either end of the sequence,
/// so every prefix and suffix shorter than `n` is covered once.
pub(super) fn ngram_windows(seq_len: usize, n: usize, fix: bool) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    if n == 0 {
        return out;
    }
    for start in 0..seq_len {
        let max_len = n.min(seq_len - start);
        for len in 1..=max_len {
            let full = len == n;
            let at_edge = start == 0 || start + len == seq_len;
            if full || (!fix && at_edge) {
                out.push((start, len));
            }
        }
    }
    out
}

/// Emit `NG:` features over `tokens`. Counts accumulate across repeated
/// windows unless `binary`.
pub(super) fn extract_ngrams(
    f: &mut SparseVector,
    tokens: &[&str],
    n: usize,
    fix: bool,
    binary: bool,
    filter: Option<&InformativenessFilter>,
) {
    for (start, len) in ngram_windows(tokens.len(), n, fix) {
        let window = &tokens[start..start + len];
        if filter.is_some_and(|flt| flt.rejects(window)) {
            continue;
        }
        let name = format!("NG:{}", window.join("_"));
        if binary {
            f.set(name, 1.0);
        } else {
            f.increment(&name, len as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(f: &SparseVector) -> Vec<&str> {
        f.keys().collect()
    }

    #[test]
    fn test_windows_fix() {
        assert_eq!(ngram_windows(4, 2, true), vec![(0, 2), (1, 2), (2, 2)]);
        assert!(ngram_windows(1, 2, true).is_empty());
    }

    #[test]
    fn test_windows_edges() {
        assert_eq!(
            ngram_windows(3, 2, false),
            vec![(0, 1), (0, 2), (1, 2), (2, 1)]
        );
        assert_eq!(
            ngram_windows(4, 3, false),
            vec![(0, 1), (0, 2), (0, 3), (1, 3), (2, 2), (3, 1)]
        );
    }

    #[test]
    fn test_windows_shorter_than_n() {
        assert_eq!(ngram_windows(2, 3, false), vec![(0, 1), (0, 2), (1, 1)]);
    }

    #[test]
    fn test_bigrams_with_edges() {
        let mut f = SparseVector::new();
        extract_ngrams(&mut f, &["a", "b", "c"], 2, false, false, None);
        assert_eq!(names(&f), vec!["NG:a", "NG:a_b", "NG:b_c", "NG:c"]);
        assert_eq!(f.get("NG:a"), 1.0);
        assert_eq!(f.get("NG:a_b"), 2.0);
    }

    #[test]
    fn test_repeated_windows_accumulate() {
        let mut f = SparseVector::new();
        extract_ngrams(&mut f, &["x", "y", "x", "y"], 2, true, false, None);
        assert_eq!(f.get("NG:x_y"), 4.0);
        assert_eq!(f.get("NG:y_x"), 2.0);

        let mut b = SparseVector::new();
        extract_ngrams(&mut b, &["x", "y", "x", "y"], 2, true, true, None);
        assert_eq!(b.get("NG:x_y"), 1.0);
    }

    #[test]
    fn test_filtered_windows_skipped() {
        let filter = InformativenessFilter::new(["le"]);
        let mut f = SparseVector::new();
        extract_ngrams(&mut f, &["le", "chat", "a"], 1, true, false, Some(&filter));
        assert_eq!(names(&f), vec!["NG:chat"]);
    }
}
