//! Recall@K over a dense similarity matrix.
//!
//! Queries are ranked against a gallery by dot product (cosine similarity
//! on unit-normalized vectors). Recall@r is the fraction of queries whose
//! label appears among the labels of their r most similar gallery vectors.

use crate::error::{EmbevalError, Result};
use crate::matrix::FeatureMatrix;

/// Sentinel written into masked entries. Valid cosine similarities lie in
/// [-1, 1], so a masked entry always sorts last.
const MASKED: f32 = -1.0;

/// Dense N x M matrix of query/gallery dot products.
///
/// Masking (e.g. self-match exclusion) is applied to individual entries
/// before ranking; the ranking itself is mask-agnostic.
pub struct SimilarityMatrix {
    values: Vec<f32>,
    gallery: usize,
}

impl SimilarityMatrix {
    /// Score every query row against every gallery row.
    pub fn new(queries: &FeatureMatrix, gallery: &FeatureMatrix) -> Result<Self> {
        if queries.dim() != gallery.dim() {
            return Err(EmbevalError::InvalidInput(format!(
                "query dimension {} does not match gallery dimension {}",
                queries.dim(),
                gallery.dim()
            )));
        }
        let mut values = Vec::with_capacity(queries.rows() * gallery.rows());
        for i in 0..queries.rows() {
            for j in 0..gallery.rows() {
                values.push(queries.dot(i, gallery, j));
            }
        }
        Ok(Self {
            values,
            gallery: gallery.rows(),
        })
    }

    /// Exclude a (query, gallery) pair from retrieval.
    pub fn invalidate(&mut self, query: usize, gallery: usize) {
        self.values[query * self.gallery + gallery] = MASKED;
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.gallery..(i + 1) * self.gallery]
    }

    /// Gallery indices for query `i`, most similar first. Ties break toward
    /// the lower gallery index (stable sort over ascending indices).
    pub fn ranked_row(&self, i: usize) -> Vec<usize> {
        let row = self.row(i);
        let mut order: Vec<usize> = (0..self.gallery).collect();
        order.sort_by(|&a, &b| {
            row[b]
                .partial_cmp(&row[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }
}

/// Compute Recall@r for each rank in `ranks`.
///
/// When `gallery_features`/`gallery_labels` are omitted the query set is its
/// own gallery (self-retrieval) and the diagonal of the similarity matrix is
/// masked so a query can never count itself as a found neighbor. When they
/// are supplied (always together), no self-exclusion applies and the gallery
/// size need not match the query count.
///
/// Vectors are assumed unit-normalized by the caller; no normalization
/// happens here, and degenerate all-zero vectors are scored as-is rather
/// than rejected.
///
/// # Returns
///
/// One value per entry of `ranks`, in the same order, each in [0.0, 1.0].
pub fn recall<L: PartialEq>(
    features: &FeatureMatrix,
    labels: &[L],
    ranks: &[usize],
    gallery_features: Option<&FeatureMatrix>,
    gallery_labels: Option<&[L]>,
) -> Result<Vec<f32>> {
    if labels.len() != features.rows() {
        return Err(EmbevalError::InvalidInput(format!(
            "{} labels for {} feature rows",
            labels.len(),
            features.rows()
        )));
    }
    if ranks.is_empty() {
        return Err(EmbevalError::InvalidInput(
            "at least one rank value is required".to_string(),
        ));
    }
    if ranks.iter().any(|&r| r == 0) {
        return Err(EmbevalError::InvalidInput(
            "rank values must be positive".to_string(),
        ));
    }

    let (gallery, gallery_labels, self_retrieval) = match (gallery_features, gallery_labels) {
        (Some(g), Some(gl)) => {
            if gl.len() != g.rows() {
                return Err(EmbevalError::InvalidInput(format!(
                    "{} gallery labels for {} gallery rows",
                    gl.len(),
                    g.rows()
                )));
            }
            (g, gl, false)
        }
        (None, None) => (features, labels, true),
        _ => {
            return Err(EmbevalError::InvalidInput(
                "gallery features and labels must be supplied together".to_string(),
            ))
        }
    };

    let mut sim = SimilarityMatrix::new(features, gallery)?;
    if self_retrieval {
        for i in 0..features.rows() {
            sim.invalidate(i, i);
        }
    }

    let num_queries = features.rows();
    let ranked: Vec<Vec<usize>> = (0..num_queries).map(|i| sim.ranked_row(i)).collect();

    let mut out = Vec::with_capacity(ranks.len());
    for &r in ranks {
        let hits = ranked
            .iter()
            .zip(labels.iter())
            .filter(|(order, label)| order.iter().take(r).any(|&j| &gallery_labels[j] == *label))
            .count();
        out.push(hits as f32 / num_queries as f32);
    }
    Ok(out)
}
