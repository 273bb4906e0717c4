//! Contiguous row-major matrix of embedding vectors.
//!
//! Shapes are fixed at construction time; one row per sample. Vectors are
//! assumed unit-normalized by the producer, so dot products behave as
//! cosine similarity.

use crate::error::{EmbevalError, Result};

/// Row-major matrix of embedding vectors: one row per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl FeatureMatrix {
    /// Build a matrix from per-sample rows. All rows must have the same
    /// non-zero width and there must be at least one row.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(EmbevalError::InvalidInput(
                "feature matrix must have at least one row".to_string(),
            ));
        }
        let dim = rows[0].len();
        if dim == 0 {
            return Err(EmbevalError::InvalidInput(
                "feature vectors must have at least one dimension".to_string(),
            ));
        }
        let mut data = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(EmbevalError::InvalidInput(format!(
                    "row {} has {} dimensions, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            dim,
        })
    }

    /// Decode a raw little-endian f32 blob into rows of width `dim`.
    ///
    /// This is the storage format used for embedding blobs: 4 bytes per
    /// value, no header. The blob length must be a whole number of rows.
    pub fn from_le_bytes(blob: &[u8], dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(EmbevalError::InvalidInput(
                "feature vectors must have at least one dimension".to_string(),
            ));
        }
        if blob.len() % 4 != 0 {
            return Err(EmbevalError::Parse(format!(
                "blob length {} is not a multiple of 4",
                blob.len()
            )));
        }
        let data: Vec<f32> = blob
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        if data.is_empty() || data.len() % dim != 0 {
            return Err(EmbevalError::Parse(format!(
                "blob holds {} values, not divisible into rows of {}",
                data.len(),
                dim
            )));
        }
        let rows = data.len() / dim;
        Ok(Self { data, rows, dim })
    }

    /// Number of rows (samples).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vector width.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embedding vector of sample `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Dot product of row `i` with row `j` of `other`. Both matrices must
    /// have the same width.
    pub fn dot(&self, i: usize, other: &FeatureMatrix, j: usize) -> f32 {
        self.row(i)
            .iter()
            .zip(other.row(j).iter())
            .map(|(x, y)| x * y)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_shape() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.dim(), 2);
        assert_eq!(m.row(1), &[0.0, 1.0]);
    }

    #[test]
    fn test_from_rows_empty() {
        let result = FeatureMatrix::from_rows(vec![]);
        assert!(matches!(result, Err(EmbevalError::InvalidInput(_))));
    }

    #[test]
    fn test_from_rows_zero_width() {
        let result = FeatureMatrix::from_rows(vec![vec![]]);
        assert!(matches!(result, Err(EmbevalError::InvalidInput(_))));
    }

    #[test]
    fn test_from_rows_ragged() {
        let result = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(matches!(result, Err(EmbevalError::InvalidInput(_))));
    }

    #[test]
    fn test_dot_identical_unit_vectors() {
        let m = FeatureMatrix::from_rows(vec![vec![0.6, 0.8], vec![0.8, 0.6]]).unwrap();
        assert!((m.dot(0, &m, 0) - 1.0).abs() < 1e-6);
        assert!((m.dot(0, &m, 1) - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_dot_orthogonal() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        assert!((m.dot(0, &m, 1)).abs() < 1e-6);
    }

    #[test]
    fn test_from_le_bytes_valid() {
        let values = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let blob: Vec<u8> = values.iter().flat_map(|f| f.to_le_bytes()).collect();
        let m = FeatureMatrix::from_le_bytes(&blob, 3).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.dim(), 3);
        for (original, decoded) in values.iter().zip(m.row(0).iter().chain(m.row(1).iter())) {
            assert!((original - decoded).abs() < 1e-6);
        }
    }

    #[test]
    fn test_from_le_bytes_truncated() {
        let blob = vec![0u8, 1, 2, 3, 4]; // 5 bytes
        let result = FeatureMatrix::from_le_bytes(&blob, 1);
        assert!(matches!(result, Err(EmbevalError::Parse(_))));
    }

    #[test]
    fn test_from_le_bytes_wrong_width() {
        let blob: Vec<u8> = vec![1.0f32, 2.0, 3.0]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        let result = FeatureMatrix::from_le_bytes(&blob, 2);
        assert!(matches!(result, Err(EmbevalError::Parse(_))));
    }

    #[test]
    fn test_from_le_bytes_empty() {
        let result = FeatureMatrix::from_le_bytes(&[], 4);
        assert!(matches!(result, Err(EmbevalError::Parse(_))));
    }
}
