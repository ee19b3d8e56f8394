use std::path::Path;

use bold_core::settings;

pub fn config_export() {
    print!("{}", settings::default_toml());
}

pub fn config_validate(file: &str) {
    let c = die!(settings::load_config(Path::new(file)), "Error: {}");
    let inputs = match c.inputs.required() {
        Ok(_) => "complete",
        Err(_) => "incomplete",
    };
    println!(
        "OK: update={}, learning_rate={}, iterate={}, ngrams={}, phrase_pairs={}, inputs {}",
        c.training.rule,
        c.training.learning_rate,
        c.training.iterations,
        c.features
            .target_ngrams
            .map(|o| format!("{}{}", o.n, if o.fix { " fix" } else { "" }))
            .unwrap_or_else(|| "off".to_string()),
        if c.features.phrase_pairs.is_some() { "on" } else { "off" },
        inputs,
    );
}
