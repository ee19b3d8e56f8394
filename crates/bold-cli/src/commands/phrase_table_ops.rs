use std::fs;
use std::path::Path;

use bold_core::phrase_table::{load_phrase_table, BloomPhraseTable, ExactPhraseTable, PhraseTable};

/// Compile a Moses text phrase table into a bloom table.
pub fn compile(input: &str, output: &str, fp_rate: f64) {
    let exact = die!(
        ExactPhraseTable::open(Path::new(input)),
        "Error reading phrase table {input}: {}"
    );
    eprintln!("Building bloom table from {} phrase pairs...", exact.len());
    let bloom = die!(
        BloomPhraseTable::from_pairs(exact.iter().collect::<Vec<_>>(), fp_rate),
        "Error: {}"
    );
    die!(
        bloom.save(Path::new(output)),
        "Error writing phrase table: {}"
    );
    let file_size = fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Wrote {output} ({:.1} MB, {} bits, {} hashes)",
        file_size as f64 / 1_048_576.0,
        bloom.num_bits(),
        bloom.num_hashes()
    );
}

pub fn query(table: &str, pair: &str) {
    let t = die!(
        load_phrase_table(Path::new(table)),
        "Error opening phrase table {table}: {}"
    );
    if t.includes(pair) {
        println!("present: {pair}");
    } else {
        println!("absent: {pair}");
        std::process::exit(1);
    }
}
