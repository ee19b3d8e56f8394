use std::io::{self, Write};
use std::time::Instant;

use tracing::{debug, debug_span, info};

use crate::candidate::Candidate;
use crate::corpus::AdditionalPhrasePairs;
use crate::features::FeatureFactory;
use crate::model::ModelStats;
use crate::phrase_table::ExactPhraseTable;
use crate::sparse::SparseVector;

use super::{best_index, score_all, UpdateRule};

/// One training instance: a source sentence, its k-best list and oracle.
#[derive(Debug, Clone)]
pub struct Example {
    pub source: String,
    pub kbest: Vec<Candidate>,
    pub oracle: Candidate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub rule: UpdateRule,
    pub learning_rate: f64,
    pub iterations: usize,
    /// Report the post-update best candidate instead of the pre-update one.
    pub cheat: bool,
    /// Log error count and model size after every example.
    pub verbose: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            rule: UpdateRule::Structured,
            learning_rate: 1.0,
            iterations: 1,
            cheat: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleOutcome {
    /// Surface of the reported hypothesis; empty for an empty k-best list.
    pub output: String,
    pub corrected: bool,
}

#[derive(Debug, Clone)]
pub struct IterationReport {
    /// 1-based.
    pub iteration: usize,
    pub errors: usize,
    pub examples: usize,
    pub model: ModelStats,
    pub elapsed_secs: f64,
}

/// Drives the online learning loop. Holds the feature factory and the
/// phrase pairs accumulated from per-example additions; the model itself
/// is passed in by the caller.
pub struct Trainer<'a> {
    factory: &'a FeatureFactory,
    options: TrainOptions,
    known_pairs: ExactPhraseTable,
}

impl<'a> Trainer<'a> {
    pub fn new(factory: &'a FeatureFactory, options: TrainOptions) -> Self {
        Self {
            factory,
            options,
            known_pairs: ExactPhraseTable::new(),
        }
    }

    pub fn options(&self) -> &TrainOptions {
        &self.options
    }

    /// Pairs admitted so far in addition to the phrase table.
    pub fn known_pairs(&self) -> &ExactPhraseTable {
        &self.known_pairs
    }

    /// Admit extra phrase pairs for this and every later example.
    pub fn add_phrase_pairs<I, S>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for p in pairs {
            self.known_pairs.insert(p);
        }
    }

    /// Extract features for every candidate of `example` and score them.
    pub fn prepare(&self, model: &SparseVector, example: &mut Example) {
        for c in example.kbest.iter_mut() {
            c.features = self.factory.produce(c, &example.source, &self.known_pairs);
        }
        score_all(&mut example.kbest, model);
        example.oracle.features =
            self.factory
                .produce(&example.oracle, &example.source, &self.known_pairs);
        example.oracle.rescore(model);
    }

    /// Process one example: select, update, and write the reported
    /// hypothesis as one line to `out`. Without cheat mode the line is
    /// written before the model changes.
    pub fn train_example(
        &self,
        model: &mut SparseVector,
        example: &mut Example,
        out: &mut dyn Write,
    ) -> io::Result<ExampleOutcome> {
        self.prepare(model, example);
        let Some(best) = best_index(&example.kbest) else {
            debug!("empty k-best list, skipping update");
            writeln!(out)?;
            return Ok(ExampleOutcome {
                output: String::new(),
                corrected: false,
            });
        };
        let pre_update = example.kbest[best].surface.clone();
        if !self.options.cheat {
            writeln!(out, "{pre_update}")?;
        }

        let corrected = self.options.rule.apply(
            model,
            &example.kbest[best],
            &example.oracle,
            self.options.learning_rate,
        );

        let output = if self.options.cheat {
            score_all(&mut example.kbest, model);
            let post_update = best_index(&example.kbest)
                .map(|i| example.kbest[i].surface.clone())
                .unwrap_or_default();
            writeln!(out, "{post_update}")?;
            post_update
        } else {
            pre_update
        };
        Ok(ExampleOutcome { output, corrected })
    }

    /// One pass over `examples` in order, one output line per example.
    pub fn run_iteration(
        &mut self,
        model: &mut SparseVector,
        examples: &mut [Example],
        additional: &AdditionalPhrasePairs,
        iteration: usize,
        out: &mut dyn Write,
    ) -> io::Result<IterationReport> {
        let _span = debug_span!("iteration", iteration).entered();
        let start = Instant::now();
        let mut errors = 0usize;

        for (index, example) in examples.iter_mut().enumerate() {
            let _span = debug_span!("example", index).entered();
            if let Some(pairs) = additional.get(index) {
                self.add_phrase_pairs(pairs.iter().cloned());
            }
            let outcome = self.train_example(model, example, out)?;
            errors += usize::from(outcome.corrected);

            if self.options.verbose {
                let stats = ModelStats::of(model);
                debug!(
                    errors,
                    model_size = stats.size,
                    pp = stats.phrase_pairs,
                    ng = stats.ngrams,
                    "example done"
                );
            } else if (index + 1) % 10 == 0 {
                info!(examples = index + 1, "progress");
            }
        }

        let elapsed_secs = start.elapsed().as_secs_f64();
        let stats = ModelStats::of(model);
        info!(
            iteration,
            iterations = self.options.iterations,
            errors,
            model_size = stats.size,
            elapsed_secs,
            "iteration done"
        );
        Ok(IterationReport {
            iteration,
            errors,
            examples: examples.len(),
            model: stats,
            elapsed_secs,
        })
    }

    /// Run all configured iterations, threading `model` through them.
    /// Outputs of every iteration go to `out` in order.
    pub fn train(
        &mut self,
        mut model: SparseVector,
        examples: &mut [Example],
        additional: &AdditionalPhrasePairs,
        out: &mut dyn Write,
    ) -> io::Result<(SparseVector, Vec<IterationReport>)> {
        let mut reports = Vec::with_capacity(self.options.iterations);
        for t in 1..=self.options.iterations {
            info!(iteration = t, iterations = self.options.iterations, "starting iteration");
            reports.push(self.run_iteration(&mut model, examples, additional, t, out)?);
        }
        Ok((model, reports))
    }
}
