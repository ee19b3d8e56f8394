use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use bold_core::corpus::{self, AdditionalPhrasePairs, CorpusError};
use bold_core::features::FeatureError;
use bold_core::learner::IterationReport;
use bold_core::model::{load_model, save_model, ModelError, ModelStats};
use bold_core::settings::{self, ConfigError, RunConfig};
use bold_core::{FeatureFactory, SparseVector, Trainer};

use crate::logging;

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Features(#[from] FeatureError),
    #[error("model {path}: {source}")]
    Model { path: PathBuf, source: ModelError },
    #[error("output {path}: {source}")]
    Output { path: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub struct TrainSummary {
    pub examples: usize,
    pub reports: Vec<IterationReport>,
    pub model: SparseVector,
    pub elapsed_secs: f64,
}

impl TrainSummary {
    pub fn total_errors(&self) -> usize {
        self.reports.iter().map(|r| r.errors).sum()
    }

    pub fn model_stats(&self) -> ModelStats {
        ModelStats::of(&self.model)
    }
}

/// Output file, or stdout when none is configured.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, io::Error> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Ok(Box::new(BufWriter::new(fs::File::create(path)?)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn output_error(path: &Path) -> impl FnOnce(io::Error) -> TrainError + '_ {
    move |source| TrainError::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// Full training run as described by `config`: load, (warm start), iterate,
/// then write hypotheses and the model.
pub fn run(config: &RunConfig) -> Result<TrainSummary, TrainError> {
    let (sources, oracles, kbest) = config.inputs.required()?;
    let mut examples = corpus::load_examples(sources, oracles, kbest)?;
    let additional = match &config.inputs.additional_phrase_pairs {
        Some(path) => AdditionalPhrasePairs::open(path)?,
        None => AdditionalPhrasePairs::new(),
    };
    let factory = FeatureFactory::from_config(&config.features)?;

    let model = match &config.inputs.init_model {
        Some(path) => {
            let m = load_model(path).map_err(|source| TrainError::Model {
                path: path.clone(),
                source,
            })?;
            info!(path = %path.display(), size = m.len(), "warm start");
            m
        }
        None => SparseVector::new(),
    };

    info!(
        examples = examples.len(),
        update = %config.training.rule,
        learning_rate = config.training.learning_rate,
        iterations = config.training.iterations,
        cheat = config.training.cheat,
        ngrams = ?config.features.target_ngrams,
        phrase_pairs = config.features.phrase_pairs.is_some(),
        phrase_table = factory.has_phrase_table(),
        binary = config.features.binary,
        additional_pairs = additional.len(),
        "running online reranker"
    );

    let output_path = config
        .outputs
        .output
        .as_deref()
        .unwrap_or(Path::new("<stdout>"));
    let mut out =
        open_output(config.outputs.output.as_deref()).map_err(output_error(output_path))?;

    let start = Instant::now();
    let mut trainer = Trainer::new(&factory, config.training);
    let (model, reports) = trainer
        .train(model, &mut examples, &additional, &mut out)
        .map_err(output_error(output_path))?;
    out.flush().map_err(output_error(output_path))?;
    drop(out);
    let elapsed_secs = start.elapsed().as_secs_f64();

    if let Some(path) = &config.outputs.output_model {
        save_model(&model, path).map_err(|source| TrainError::Model {
            path: path.clone(),
            source,
        })?;
    }

    let per_example = elapsed_secs / examples.len().max(1) as f64;
    info!(
        elapsed_secs,
        per_example_secs = per_example,
        model_size = model.len(),
        "done"
    );
    Ok(TrainSummary {
        examples: examples.len(),
        reports,
        model,
        elapsed_secs,
    })
}

pub fn train(config_file: &str, trace_dir: Option<&str>) {
    let config = die!(
        settings::load_config(Path::new(config_file)),
        "Error in config {config_file}: {}"
    );
    let _guard = logging::init_logging(
        logging::level_for(config.silent, config.training.verbose),
        trace_dir.map(Path::new),
    );
    die!(run(&config), "Error: {}");
}
