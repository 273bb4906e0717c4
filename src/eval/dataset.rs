//! Feature-set files for the evaluation CLI.
//!
//! An upstream inference run writes embeddings and their labels to disk;
//! this module reads them back, either as JSON or as the raw little-endian
//! f32 blob format embeddings are stored in.

use crate::error::{EmbevalError, Result};
use crate::matrix::FeatureMatrix;
use serde::Deserialize;
use std::path::Path;

/// A batch of embeddings with parallel labels.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalSet {
    /// Class labels, 1:1 with feature rows.
    pub labels: Vec<i64>,
    /// Embedding vectors, one per sample, unit-normalized upstream.
    pub features: Vec<Vec<f32>>,
}

impl EvalSet {
    /// Load from JSON: `{"labels": [...], "features": [[...], ...]}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| EmbevalError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Validate shape and split into a feature matrix plus labels.
    pub fn into_parts(self) -> Result<(FeatureMatrix, Vec<i64>)> {
        let matrix = FeatureMatrix::from_rows(self.features)?;
        if self.labels.len() != matrix.rows() {
            return Err(EmbevalError::InvalidInput(format!(
                "{} labels for {} feature rows",
                self.labels.len(),
                matrix.rows()
            )));
        }
        Ok((matrix, self.labels))
    }
}

/// Load features from a raw little-endian f32 blob of `dim`-wide rows plus
/// a label file with one integer per line.
pub fn load_raw(
    features_path: &Path,
    labels_path: &Path,
    dim: usize,
) -> Result<(FeatureMatrix, Vec<i64>)> {
    let blob = std::fs::read(features_path)?;
    let matrix = FeatureMatrix::from_le_bytes(&blob, dim)?;

    let raw_labels = std::fs::read_to_string(labels_path)?;
    let mut labels = Vec::new();
    for (lineno, line) in raw_labels.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let label: i64 = line.parse().map_err(|_| {
            EmbevalError::Parse(format!(
                "{}:{}: invalid label '{}'",
                labels_path.display(),
                lineno + 1,
                line
            ))
        })?;
        labels.push(label);
    }

    if labels.len() != matrix.rows() {
        return Err(EmbevalError::InvalidInput(format!(
            "{} labels for {} feature rows",
            labels.len(),
            matrix.rows()
        )));
    }
    Ok((matrix, labels))
}
