// ---------------------------------------------------------------------------
// Similarity Engine — dense pairwise cosine similarity
// ---------------------------------------------------------------------------
//
// Computes the full N×N cosine-similarity matrix for a static corpus in one
// batch. Storage is dense row-major f64, so memory is O(N² · 8) bytes and
// dominates for large catalogs; the dataset is assumed small enough for that
// to be acceptable. Only the upper triangle is computed; the lower triangle
// is mirrored so symmetry is exact rather than subject to rounding.
// ---------------------------------------------------------------------------

use tracing::debug;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Vector math
// ---------------------------------------------------------------------------

/// Compute the L2 norm of a vector.
pub fn l2_norm(v: &[f64]) -> f64 {
	v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine similarity of two vectors. Returns 0.0 on dimension mismatch or
/// when either vector has zero norm. Result clamped to [-1.0, 1.0].
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}
	cosine_with_norms(a, b, l2_norm(a), l2_norm(b))
}

/// Cosine similarity with precomputed norms, for batch use.
fn cosine_with_norms(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
	let denom = norm_a * norm_b;
	if denom == 0.0 {
		return 0.0;
	}
	let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
	let result = dot / denom;
	if !result.is_finite() {
		return 0.0;
	}
	result.clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// SimilarityMatrix
// ---------------------------------------------------------------------------

/// Symmetric N×N cosine-similarity matrix in row-major order.
///
/// Invariants: `get(i, i) == 1.0` for every row, `get(i, j) == get(j, i)`
/// exactly, and row order matches the catalog row order it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
	rows: usize,
	data: Vec<f64>,
}

impl SimilarityMatrix {
	/// Compute the full matrix from one feature row per item.
	///
	/// Norms are precomputed once, so the batch costs O(N²·V) multiplies
	/// over the shared vocabulary size V. The diagonal is pinned to exactly
	/// 1.0, including for all-zero feature rows.
	pub fn from_vectors(vectors: &[Vec<f64>]) -> Self {
		let rows = vectors.len();
		let norms: Vec<f64> = vectors.iter().map(|v| l2_norm(v)).collect();
		let mut data = vec![0.0; rows * rows];

		for i in 0..rows {
			data[i * rows + i] = 1.0;
			for j in (i + 1)..rows {
				let score =
					cosine_with_norms(&vectors[i], &vectors[j], norms[i], norms[j]);
				data[i * rows + j] = score;
				// Mirror the upper triangle for exact symmetry.
				data[j * rows + i] = score;
			}
		}

		debug!(rows, "computed similarity matrix");
		Self { rows, data }
	}

	/// Reassemble a matrix from persisted row-major data.
	pub fn from_raw(rows: usize, data: Vec<f64>) -> Result<Self, EngineError> {
		if data.len() != rows * rows {
			return Err(EngineError::Corruption(format!(
				"matrix data has {} entries, expected {} for {} rows",
				data.len(),
				rows * rows,
				rows
			)));
		}
		Ok(Self { rows, data })
	}

	pub fn rows(&self) -> usize {
		self.rows
	}

	pub fn get(&self, i: usize, j: usize) -> f64 {
		self.data[i * self.rows + j]
	}

	/// All similarity scores for one item, in catalog row order.
	pub fn row(&self, i: usize) -> &[f64] {
		&self.data[i * self.rows..(i + 1) * self.rows]
	}

	/// Row-major backing data, for persistence.
	pub fn data(&self) -> &[f64] {
		&self.data
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_vectors() {
		let v = vec![1.0, 2.0, 3.0];
		assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn orthogonal_vectors() {
		let a = vec![1.0, 0.0];
		let b = vec![0.0, 1.0];
		assert!(cosine_similarity(&a, &b).abs() < 1e-12);
	}

	#[test]
	fn zero_norm_vector_scores_zero() {
		let a = vec![0.0, 0.0];
		let b = vec![1.0, 2.0];
		assert_eq!(cosine_similarity(&a, &b), 0.0);
	}

	#[test]
	fn mismatched_lengths_score_zero() {
		assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
	}

	#[test]
	fn matrix_diagonal_is_exactly_one() {
		let vectors = vec![
			vec![1.0, 0.0],
			vec![0.0, 0.0], // zero row still gets a 1.0 self-entry
			vec![0.5, 0.5],
		];
		let m = SimilarityMatrix::from_vectors(&vectors);
		for i in 0..m.rows() {
			assert_eq!(m.get(i, i), 1.0);
		}
	}

	#[test]
	fn matrix_is_exactly_symmetric() {
		let vectors = vec![
			vec![1.0, 2.0, 0.0],
			vec![0.3, 0.0, 0.7],
			vec![0.0, 1.0, 1.0],
		];
		let m = SimilarityMatrix::from_vectors(&vectors);
		for i in 0..m.rows() {
			for j in 0..m.rows() {
				assert_eq!(m.get(i, j), m.get(j, i));
			}
		}
	}

	#[test]
	fn zero_row_is_zero_off_diagonal() {
		let vectors = vec![vec![1.0, 0.0], vec![0.0, 0.0]];
		let m = SimilarityMatrix::from_vectors(&vectors);
		assert_eq!(m.get(0, 1), 0.0);
		assert_eq!(m.get(1, 0), 0.0);
	}

	#[test]
	fn empty_corpus_matrix() {
		let m = SimilarityMatrix::from_vectors(&[]);
		assert_eq!(m.rows(), 0);
		assert!(m.data().is_empty());
	}

	#[test]
	fn row_slice_matches_get() {
		let vectors = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
		let m = SimilarityMatrix::from_vectors(&vectors);
		let row = m.row(1);
		assert_eq!(row.len(), 2);
		assert_eq!(row[0], m.get(1, 0));
		assert_eq!(row[1], m.get(1, 1));
	}

	#[test]
	fn from_raw_rejects_wrong_length() {
		assert!(SimilarityMatrix::from_raw(2, vec![0.0; 3]).is_err());
		assert!(SimilarityMatrix::from_raw(2, vec![0.0; 4]).is_ok());
	}
}
