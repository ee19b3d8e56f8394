use std::path::Path;

use serde::Serialize;

use bold_core::model::{load_model, top_features, ModelStats};

#[derive(Debug, Serialize)]
struct ModelReport<'a> {
    stats: ModelStats,
    top: Vec<FeatureWeight<'a>>,
}

#[derive(Debug, Serialize)]
struct FeatureWeight<'a> {
    name: &'a str,
    weight: f64,
}

pub fn model_inspect(file: &str, n: usize, json: bool) {
    let model = die!(load_model(Path::new(file)), "Error reading model {file}: {}");
    let stats = ModelStats::of(&model);
    let top = top_features(&model, n);

    if json {
        let report = ModelReport {
            stats,
            top: top
                .into_iter()
                .map(|(name, weight)| FeatureWeight { name, weight })
                .collect(),
        };
        println!(
            "{}",
            die!(serde_json::to_string_pretty(&report), "Error: {}")
        );
        return;
    }

    println!(
        "model size: {} (PP {}, NG {}, other {})",
        stats.size, stats.phrase_pairs, stats.ngrams, stats.other
    );
    for (name, weight) in top {
        println!("{weight:>12.4}  {name}");
    }
}
