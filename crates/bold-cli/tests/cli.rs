use assert_cmd::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;

fn write_run(dir: &Path, update: &str) -> String {
    fs::write(dir.join("src.txt"), "the cat sat\n").unwrap();
    fs::write(dir.join("oracles.txt"), "0 : le chat [0-1] assis [2]\n").unwrap();
    fs::write(
        dir.join("kbest.txt"),
        "0 ||| un chat |0-1| assis |2| ||| lm: -3 ||| -1.0\n",
    )
    .unwrap();
    let config = format!(
        "sources = \"src.txt\"\n\
         oracles = \"oracles.txt\"\n\
         kbest_lists = \"kbest.txt\"\n\
         ff_phrase_pairs = \"pp\"\n\
         output = \"hyp.txt\"\n\
         output_model = \"model.json\"\n\
         silent = true\n\
         update = \"{update}\"\n"
    );
    let path = dir.join("run.toml");
    fs::write(&path, config).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn train_exits_non_zero_on_unknown_update_rule() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_run(dir.path(), "mira");

    let bin = assert_cmd::cargo::cargo_bin!("boldtool");
    let assert = Command::new(bin)
        .args(["train", config.as_str()])
        .assert()
        .failure()
        .code(1);

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr");
    assert!(stderr.contains("unknown update rule 'mira'"), "{stderr}");
    assert!(!dir.path().join("hyp.txt").exists());
    assert!(!dir.path().join("model.json").exists());
}

#[test]
fn train_writes_outputs_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_run(dir.path(), "structured");

    let bin = assert_cmd::cargo::cargo_bin!("boldtool");
    Command::new(bin)
        .args(["train", config.as_str()])
        .assert()
        .success();

    let hyp = fs::read_to_string(dir.path().join("hyp.txt")).unwrap();
    assert_eq!(hyp, "un chat assis\n");
    let model = fs::read_to_string(dir.path().join("model.json")).unwrap();
    assert!(model.contains("PP:the,cat~le,chat"));
}

#[test]
fn config_validate_rejects_unknown_update_rule() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_run(dir.path(), "averaged");

    let bin = assert_cmd::cargo::cargo_bin!("boldtool");
    Command::new(bin)
        .args(["config", "validate", config.as_str()])
        .assert()
        .failure()
        .code(1);
}
