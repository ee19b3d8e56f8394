//! Model persistence and inspection.
//!
//! The model is stored as the textual form of its [`SparseVector`]: a JSON
//! object mapping feature names to weights.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::sparse::SparseVector;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid model text: {0}")]
    Format(#[from] serde_json::Error),
}

/// Atomic write: write to .tmp then rename.
pub fn save_model(model: &SparseVector, path: &Path) -> Result<(), ModelError> {
    let mut text = model.to_text()?;
    text.push('\n');
    let tmp = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_model(path: &Path) -> Result<SparseVector, ModelError> {
    let text = fs::read_to_string(path)?;
    Ok(SparseVector::from_text(text.trim())?)
}

/// Feature counts per family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub size: usize,
    pub phrase_pairs: usize,
    pub ngrams: usize,
    pub other: usize,
}

impl ModelStats {
    pub fn of(model: &SparseVector) -> Self {
        let mut stats = ModelStats {
            size: model.len(),
            ..ModelStats::default()
        };
        for name in model.keys() {
            match name.split(':').next() {
                Some("PP") => stats.phrase_pairs += 1,
                Some("NG") => stats.ngrams += 1,
                _ => stats.other += 1,
            }
        }
        stats
    }
}

/// The `k` features with the largest absolute weight, heaviest first.
pub fn top_features(model: &SparseVector, k: usize) -> Vec<(&str, f64)> {
    let mut all: Vec<(&str, f64)> = model.iter().collect();
    all.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    all.truncate(k);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> SparseVector {
        let mut m = SparseVector::new();
        m.set("PP:the,cat~le,chat", 2.0);
        m.set("PP:sat~assis", -0.5);
        m.set("NG:le_chat", -3.0);
        m.set("bias", 0.1);
        m
    }

    #[test]
    fn test_stats() {
        let s = ModelStats::of(&model());
        assert_eq!(
            s,
            ModelStats {
                size: 4,
                phrase_pairs: 2,
                ngrams: 1,
                other: 1
            }
        );
    }

    #[test]
    fn test_top_features() {
        let m = model();
        let top = top_features(&m, 2);
        assert_eq!(top, vec![("NG:le_chat", -3.0), ("PP:the,cat~le,chat", 2.0)]);
        assert_eq!(top_features(&m, 10).len(), 4);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("model.json");
        save_model(&model(), &path).unwrap();
        assert!(!path.with_extension("tmp").exists());
        assert_eq!(load_model(&path).unwrap(), model());
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_model(&path), Err(ModelError::Format(_))));
        assert!(matches!(
            load_model(&dir.path().join("missing.json")),
            Err(ModelError::Io(_))
        ));
    }
}
