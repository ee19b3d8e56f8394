//! Online discriminative reranking of machine-translation k-best lists.
//!
//! Candidates are turned into sparse phrase-pair and n-gram features, scored
//! with a linear model, and the model is corrected towards an oracle with a
//! structured or ranking perceptron update.

pub mod candidate;
pub mod corpus;
pub mod features;
pub mod learner;
pub mod model;
pub mod phrase_table;
pub mod settings;
pub mod sparse;

pub use candidate::Candidate;
pub use features::{FeatureConfig, FeatureFactory};
pub use learner::{Example, TrainOptions, Trainer, UpdateRule};
pub use sparse::SparseVector;
