use clap::{Parser, Subcommand};

use bold_cli::commands::{config_ops, features_ops, model_ops, phrase_table_ops, train_ops};

#[derive(Parser)]
#[command(name = "boldtool", about = "Online reranking of MT k-best lists")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a reranking model from a run configuration
    Train {
        /// Path to the run configuration (TOML)
        config_file: String,
        /// Also write a JSON-lines trace into this directory
        #[arg(long)]
        trace_log: Option<String>,
    },
    /// Run configuration utilities
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Phrase table utilities
    PhraseTable {
        #[command(subcommand)]
        action: PhraseTableAction,
    },
    /// Model utilities
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Show the features extracted for one training example
    Features {
        /// Path to the run configuration (TOML)
        config_file: String,
        /// 1-based example index
        index: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the annotated template configuration
    Export,
    /// Parse and validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[derive(Subcommand)]
enum PhraseTableAction {
    /// Compile a Moses text phrase table into a bloom table
    Compile {
        /// Moses phrase table (text)
        input: String,
        /// Output file
        output: String,
        /// Target false-positive rate
        #[arg(long, default_value = "0.001")]
        fp_rate: f64,
    },
    /// Check whether a phrase pair is in a table
    Query {
        /// Phrase table (text or compiled)
        table: String,
        /// Pair as '<source> ||| <target>'
        pair: String,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Print model size and heaviest features
    Inspect {
        /// Model file (JSON)
        model_file: String,
        /// Number of features to show
        #[arg(short, long, default_value = "20")]
        n: usize,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            config_file,
            trace_log,
        } => train_ops::train(&config_file, trace_log.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Export => config_ops::config_export(),
            ConfigAction::Validate { file } => config_ops::config_validate(&file),
        },
        Command::PhraseTable { action } => match action {
            PhraseTableAction::Compile {
                input,
                output,
                fp_rate,
            } => phrase_table_ops::compile(&input, &output, fp_rate),
            PhraseTableAction::Query { table, pair } => phrase_table_ops::query(&table, &pair),
        },
        Command::Model { action } => match action {
            ModelAction::Inspect {
                model_file,
                n,
                json,
            } => model_ops::model_inspect(&model_file, n, json),
        },
        Command::Features {
            config_file,
            index,
            json,
        } => features_ops::dump(&config_file, index, json),
    }
}
