//! Run configuration loaded from TOML.
//!
//! - `parse_config(toml)` deserializes and validates a [`RunConfig`]
//! - `load_config(path)` additionally resolves relative paths against the
//!   directory holding the config file
//! - The annotated template is embedded via `include_str!("default_config.toml")`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::features::{FeatureConfig, NgramOptions, PhrasePairOptions};
use crate::learner::{TrainOptions, UnknownUpdateRule, UpdateRule};

pub const DEFAULT_CONFIG_TOML: &str = include_str!("default_config.toml");

/// Returns the embedded template configuration.
pub fn default_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error(transparent)]
    UnknownUpdateRule(#[from] UnknownUpdateRule),
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("missing required input: {0}")]
    MissingInput(&'static str),
}

/// Keys as written in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    sources: Option<PathBuf>,
    oracles: Option<PathBuf>,
    kbest_lists: Option<PathBuf>,
    ff_target_ngrams: Option<String>,
    ff_phrase_pairs: Option<String>,
    #[serde(default)]
    binary_feature_values: bool,
    filter_features: Option<PathBuf>,
    update: String,
    #[serde(default = "default_learning_rate")]
    learning_rate: f64,
    #[serde(default = "default_iterate")]
    iterate: usize,
    init_model: Option<PathBuf>,
    output: Option<PathBuf>,
    output_model: Option<PathBuf>,
    additional_phrase_pairs: Option<PathBuf>,
    #[serde(default)]
    silent: bool,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    cheat: bool,
}

fn default_learning_rate() -> f64 {
    1.0
}

fn default_iterate() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputPaths {
    pub sources: Option<PathBuf>,
    pub oracles: Option<PathBuf>,
    pub kbest_lists: Option<PathBuf>,
    pub additional_phrase_pairs: Option<PathBuf>,
    pub init_model: Option<PathBuf>,
}

impl InputPaths {
    /// Sources, oracles and k-best lists, all of which training needs.
    pub fn required(&self) -> Result<(&Path, &Path, &Path), ConfigError> {
        let sources = self
            .sources
            .as_deref()
            .ok_or(ConfigError::MissingInput("sources"))?;
        let oracles = self
            .oracles
            .as_deref()
            .ok_or(ConfigError::MissingInput("oracles"))?;
        let kbest = self
            .kbest_lists
            .as_deref()
            .ok_or(ConfigError::MissingInput("kbest_lists"))?;
        Ok((sources, oracles, kbest))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub output: Option<PathBuf>,
    pub output_model: Option<PathBuf>,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub inputs: InputPaths,
    pub outputs: OutputPaths,
    pub features: FeatureConfig,
    pub training: TrainOptions,
    pub silent: bool,
}

pub fn parse_config(toml_str: &str) -> Result<RunConfig, ConfigError> {
    let raw: RawConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate(raw)
}

/// Read, parse and validate a config file. Relative paths are taken
/// relative to the file's directory.
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = parse_config(&text)?;
    if let Some(base) = path.parent() {
        cfg.resolve_relative(base);
    }
    Ok(cfg)
}

impl RunConfig {
    /// Prefix every relative path with `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        let fix = |p: &mut Option<PathBuf>| {
            if let Some(path) = p {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        fix(&mut self.inputs.sources);
        fix(&mut self.inputs.oracles);
        fix(&mut self.inputs.kbest_lists);
        fix(&mut self.inputs.additional_phrase_pairs);
        fix(&mut self.inputs.init_model);
        fix(&mut self.outputs.output);
        fix(&mut self.outputs.output_model);
        fix(&mut self.features.stopwords);
        if let Some(pp) = self.features.phrase_pairs.as_mut() {
            fix(&mut pp.table);
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// `"<n> [fix]"`
fn parse_ngram_option(value: &str) -> Result<NgramOptions, ConfigError> {
    let args: Vec<&str> = value.split_whitespace().collect();
    let n = match args.first().map(|a| a.parse::<usize>()) {
        Some(Ok(n)) if n >= 1 => n,
        _ => return Err(invalid("ff_target_ngrams", "expected '<n> [fix]' with n >= 1")),
    };
    let fix = match args.get(1..) {
        Some([]) | None => false,
        Some(["fix"]) => true,
        _ => return Err(invalid("ff_target_ngrams", "only 'fix' may follow n")),
    };
    Ok(NgramOptions { n, fix })
}

/// `"<mode> [table_path]"`
fn parse_phrase_pair_option(value: &str) -> Result<PhrasePairOptions, ConfigError> {
    let args: Vec<&str> = value.split_whitespace().collect();
    match args.as_slice() {
        [_mode] => Ok(PhrasePairOptions { table: None }),
        [_mode, table] => Ok(PhrasePairOptions {
            table: Some(PathBuf::from(table)),
        }),
        _ => Err(invalid(
            "ff_phrase_pairs",
            "expected '<mode> [phrase_table_path]'",
        )),
    }
}

fn validate(raw: RawConfig) -> Result<RunConfig, ConfigError> {
    let rule: UpdateRule = raw.update.parse()?;
    if raw.iterate == 0 {
        return Err(invalid("iterate", "must be positive"));
    }
    if !raw.learning_rate.is_finite() || raw.learning_rate <= 0.0 {
        return Err(invalid("learning_rate", "must be a positive number"));
    }
    let target_ngrams = raw
        .ff_target_ngrams
        .as_deref()
        .map(parse_ngram_option)
        .transpose()?;
    let phrase_pairs = raw
        .ff_phrase_pairs
        .as_deref()
        .map(parse_phrase_pair_option)
        .transpose()?;

    Ok(RunConfig {
        inputs: InputPaths {
            sources: raw.sources,
            oracles: raw.oracles,
            kbest_lists: raw.kbest_lists,
            additional_phrase_pairs: raw.additional_phrase_pairs,
            init_model: raw.init_model,
        },
        outputs: OutputPaths {
            output: raw.output,
            output_model: raw.output_model,
        },
        features: FeatureConfig {
            target_ngrams,
            phrase_pairs,
            binary: raw.binary_feature_values,
            stopwords: raw.filter_features,
        },
        training: TrainOptions {
            rule,
            learning_rate: raw.learning_rate,
            iterations: raw.iterate,
            cheat: raw.cheat,
            verbose: raw.verbose,
        },
        silent: raw.silent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let c = parse_config(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(c.training.rule, UpdateRule::Structured);
        assert_eq!(c.training.iterations, 1);
        assert!((c.training.learning_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            c.features.target_ngrams,
            Some(NgramOptions { n: 2, fix: false })
        );
        assert_eq!(c.features.phrase_pairs, Some(PhrasePairOptions { table: None }));
        assert!(!c.features.binary);
        assert!(!c.training.cheat);
        assert!(c.inputs.required().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
sources = "src.txt"
oracles = "oracles.txt"
kbest_lists = "kbest.txt"
ff_target_ngrams = "3 fix"
ff_phrase_pairs = "table /data/pt.bdpt"
binary_feature_values = true
filter_features = "stop.txt"
update = "ranking"
learning_rate = 0.25
iterate = 5
init_model = "init.json"
output = "out.txt"
output_model = "model.json"
additional_phrase_pairs = "add.txt"
silent = true
verbose = true
cheat = true
"#;
        let c = parse_config(toml).unwrap();
        assert_eq!(c.training.rule, UpdateRule::Ranking);
        assert_eq!(c.training.iterations, 5);
        assert!(c.training.cheat && c.training.verbose && c.silent);
        assert_eq!(c.features.target_ngrams, Some(NgramOptions { n: 3, fix: true }));
        assert_eq!(
            c.features.phrase_pairs.as_ref().unwrap().table.as_deref(),
            Some(Path::new("/data/pt.bdpt"))
        );
        assert!(c.features.binary);
    }

    #[test]
    fn error_unknown_update_rule() {
        let err = parse_config("update = \"averaged\"").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownUpdateRule(_)));
        assert!(err.to_string().contains("averaged"));
    }

    #[test]
    fn error_missing_update_rule() {
        let err = parse_config("iterate = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn error_zero_iterations() {
        let err = parse_config("update = \"structured\"\niterate = 0").unwrap_err();
        assert!(err.to_string().contains("iterate"));
    }

    #[test]
    fn error_bad_learning_rate() {
        let err = parse_config("update = \"structured\"\nlearning_rate = -1.0").unwrap_err();
        assert!(err.to_string().contains("learning_rate"));
    }

    #[test]
    fn error_bad_ngram_option() {
        for bad in ["0", "x", "2 fixed", "2 fix extra", ""] {
            let toml = format!("update = \"structured\"\nff_target_ngrams = \"{bad}\"");
            let err = parse_config(&toml).unwrap_err();
            assert!(err.to_string().contains("ff_target_ngrams"), "{bad}");
        }
    }

    #[test]
    fn error_bad_phrase_pair_option() {
        let err = parse_config("update = \"structured\"\nff_phrase_pairs = \"\"").unwrap_err();
        assert!(err.to_string().contains("ff_phrase_pairs"));
    }

    #[test]
    fn error_unknown_key() {
        let err = parse_config("update = \"structured\"\nlearning_rte = 1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_inputs_reported() {
        let c = parse_config("update = \"structured\"").unwrap();
        let err = c.inputs.required().unwrap_err();
        assert!(err.to_string().contains("sources"));
    }

    #[test]
    fn relative_paths_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "update = \"structured\"\nsources = \"src.txt\"\nff_phrase_pairs = \"t pt.txt\"\noutput = \"/abs/out.txt\"",
        )
        .unwrap();
        let c = load_config(&path).unwrap();
        assert_eq!(c.inputs.sources, Some(dir.path().join("src.txt")));
        assert_eq!(
            c.features.phrase_pairs.unwrap().table,
            Some(dir.path().join("pt.txt"))
        );
        assert_eq!(c.outputs.output, Some(PathBuf::from("/abs/out.txt")));
    }
}
