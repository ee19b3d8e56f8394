use std::path::Path;
use std::process;

use serde::Serialize;

use bold_core::corpus::{self, AdditionalPhrasePairs};
use bold_core::learner::Example;
use bold_core::model::load_model;
use bold_core::settings;
use bold_core::{FeatureFactory, SparseVector, Trainer};

#[derive(Debug, Serialize)]
struct CandidateDump<'a> {
    kind: &'static str,
    surface: &'a str,
    score: Option<f64>,
    features: &'a SparseVector,
}

fn dump_of<'a>(kind: &'static str, c: &'a bold_core::Candidate) -> CandidateDump<'a> {
    CandidateDump {
        kind,
        surface: &c.surface,
        score: c.score,
        features: &c.features,
    }
}

/// Print the features of one example's candidates and oracle, as the first
/// training iteration would see them. `index` is 1-based.
pub fn dump(config_file: &str, index: usize, json: bool) {
    let config = die!(
        settings::load_config(Path::new(config_file)),
        "Error in config {config_file}: {}"
    );
    let (sources, oracles, kbest) = die!(config.inputs.required(), "Error: {}");
    let mut examples = die!(
        corpus::load_examples(sources, oracles, kbest),
        "Error reading corpus: {}"
    );
    if index == 0 || index > examples.len() {
        eprintln!(
            "Error: example index {index} out of range (1..={})",
            examples.len()
        );
        process::exit(1);
    }
    let additional = match &config.inputs.additional_phrase_pairs {
        Some(path) => die!(
            AdditionalPhrasePairs::open(path),
            "Error reading additional phrase pairs: {}"
        ),
        None => AdditionalPhrasePairs::new(),
    };
    let factory = die!(
        FeatureFactory::from_config(&config.features),
        "Error loading feature resources: {}"
    );
    let model = match &config.inputs.init_model {
        Some(path) => die!(load_model(path), "Error reading model: {}"),
        None => SparseVector::new(),
    };

    let mut trainer = Trainer::new(&factory, config.training);
    for i in 0..index {
        if let Some(pairs) = additional.get(i) {
            trainer.add_phrase_pairs(pairs.iter().cloned());
        }
    }
    let example: &mut Example = &mut examples[index - 1];
    trainer.prepare(&model, example);

    if json {
        let mut all: Vec<CandidateDump<'_>> =
            example.kbest.iter().map(|c| dump_of("kbest", c)).collect();
        all.push(dump_of("oracle", &example.oracle));
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&all), "Error: {}")
        );
        return;
    }

    println!("source: {}", example.source);
    let entries = example
        .kbest
        .iter()
        .map(|c| ("kbest", c))
        .chain(std::iter::once(("oracle", &example.oracle)));
    for (kind, c) in entries {
        println!(
            "[{kind}] score={:.4} {}",
            c.score_or_min(),
            c.surface
        );
        for (name, weight) in c.features.iter() {
            println!("    {weight:>8.3}  {name}");
        }
    }
}
