//! Evaluation framework: Recall@K metric and feature-set loading.

pub mod dataset;
pub mod metrics;

pub use dataset::EvalSet;
pub use metrics::{recall, SimilarityMatrix};
