// ---------------------------------------------------------------------------
// Snapshot persistence — gzipped JSON with a packed matrix
// ---------------------------------------------------------------------------
//
// The build phase persists exactly one artifact pairing the ordered movie
// table with the similarity matrix, so the two can never drift apart or be
// mixed across builds. On-disk format: `snapshot.gz`, gzipped JSON:
//
//   { "version": 1,
//     "movies": [ ... ],
//     "matrix": { "rows": N, "data": "<base64 f64 LE, row-major>" } }
//
// The matrix travels as raw little-endian f64 bytes, so scores round-trip
// bit-exactly. Serialization completes in memory before anything touches
// disk; a failed build leaves no partial snapshot behind.
// ---------------------------------------------------------------------------

use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::CatalogIndex;
use crate::error::EngineError;
use crate::similarity::SimilarityMatrix;
use crate::types::Movie;

pub const SNAPSHOT_FILE: &str = "snapshot.gz";
const SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Matrix encode / decode
// ---------------------------------------------------------------------------

/// Encode an f64 slice as base64 of little-endian bytes.
pub fn encode_matrix(data: &[f64]) -> String {
	let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
	STANDARD.encode(&bytes)
}

/// Decode base64-encoded little-endian f64 bytes.
pub fn decode_matrix(encoded: &str) -> Result<Vec<f64>, EngineError> {
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| EngineError::Corruption(format!("invalid base64: {}", e)))?;
	if bytes.len() % 8 != 0 {
		return Err(EngineError::Corruption(
			"matrix byte length is not a multiple of 8".into(),
		));
	}
	let mut data = Vec::with_capacity(bytes.len() / 8);
	for chunk in bytes.chunks_exact(8) {
		let mut buf = [0u8; 8];
		buf.copy_from_slice(chunk);
		data.push(f64::from_le_bytes(buf));
	}
	Ok(data)
}

// ---------------------------------------------------------------------------
// Gzip compress / decompress
// ---------------------------------------------------------------------------

pub fn compress(data: &[u8]) -> Result<Vec<u8>, EngineError> {
	let mut encoder = GzEncoder::new(data, Compression::new(6));
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(compressed)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>, EngineError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder.read_to_end(&mut decompressed)?;
	Ok(decompressed)
}

/// Check for the gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
	version: u32,
	movies: Vec<Movie>,
	matrix: MatrixData,
}

#[derive(Debug, Serialize, Deserialize)]
struct MatrixData {
	rows: usize,
	data: String,
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

/// Persist the catalog + matrix pair under `dir` as `snapshot.gz`.
pub fn save(
	dir: &Path,
	catalog: &CatalogIndex,
	matrix: &SimilarityMatrix,
) -> Result<(), EngineError> {
	std::fs::create_dir_all(dir)?;

	let snapshot = SnapshotFile {
		version: SNAPSHOT_VERSION,
		movies: catalog.movies().to_vec(),
		matrix: MatrixData {
			rows: matrix.rows(),
			data: encode_matrix(matrix.data()),
		},
	};

	let json = serde_json::to_string(&snapshot)
		.map_err(|e| EngineError::Serialization(format!("failed to serialize snapshot: {}", e)))?;
	let compressed = compress(json.as_bytes())?;

	let path = dir.join(SNAPSHOT_FILE);
	std::fs::write(&path, &compressed)?;
	info!(path = %path.display(), movies = catalog.len(), "saved snapshot");
	Ok(())
}

/// Load a snapshot from `dir`. A missing file is `SnapshotMissing` (the
/// remedy is re-running the build); anything undecodable, a wrong version,
/// or a row-count mismatch between table and matrix is `Corruption`.
pub fn load(dir: &Path) -> Result<(CatalogIndex, SimilarityMatrix), EngineError> {
	let path = dir.join(SNAPSHOT_FILE);
	if !path.exists() {
		return Err(EngineError::SnapshotMissing);
	}
	let raw = std::fs::read(&path)?;

	let json_bytes = if is_gzipped(&raw) { decompress(&raw)? } else { raw };
	let json = std::str::from_utf8(&json_bytes)
		.map_err(|e| EngineError::Corruption(format!("invalid UTF-8 in snapshot: {}", e)))?;
	let snapshot: SnapshotFile = serde_json::from_str(json)
		.map_err(|e| EngineError::Corruption(format!("invalid snapshot JSON: {}", e)))?;

	if snapshot.version != SNAPSHOT_VERSION {
		return Err(EngineError::Corruption(format!(
			"unsupported snapshot version: {}",
			snapshot.version
		)));
	}
	if snapshot.movies.len() != snapshot.matrix.rows {
		return Err(EngineError::Corruption(format!(
			"row count mismatch: {} movies vs {} matrix rows",
			snapshot.movies.len(),
			snapshot.matrix.rows
		)));
	}

	let data = decode_matrix(&snapshot.matrix.data)?;
	let matrix = SimilarityMatrix::from_raw(snapshot.matrix.rows, data)?;
	let catalog = CatalogIndex::from_movies(snapshot.movies);
	info!(path = %path.display(), movies = catalog.len(), "loaded snapshot");
	Ok((catalog, matrix))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	fn movie(id: u32, title: &str, genres: &[&str]) -> Movie {
		Movie {
			id,
			title: title.to_string(),
			genres: genres.iter().map(|g| g.to_string()).collect(),
			tmdb_id: None,
			avg_rating: None,
		}
	}

	fn sample() -> (CatalogIndex, SimilarityMatrix) {
		let catalog = CatalogIndex::from_movies(vec![
			movie(1, "Toy Story (1995)", &["Animation", "Comedy"]),
			movie(2, "Heat (1995)", &["Action", "Crime"]),
		]);
		let matrix = SimilarityMatrix::from_raw(2, vec![1.0, 0.25, 0.25, 1.0]).unwrap();
		(catalog, matrix)
	}

	#[test]
	fn encode_decode_matrix_roundtrip_is_bit_exact() {
		let original = vec![1.0, 0.123456789012345e-7, -0.5, 2.0 / 3.0];
		let decoded = decode_matrix(&encode_matrix(&original)).unwrap();
		assert_eq!(original.len(), decoded.len());
		for (a, b) in original.iter().zip(decoded.iter()) {
			assert_eq!(a.to_bits(), b.to_bits());
		}
	}

	#[test]
	fn decode_matrix_rejects_bad_base64() {
		assert!(decode_matrix("!!!nope!!!").is_err());
	}

	#[test]
	fn decode_matrix_rejects_wrong_length() {
		let encoded = STANDARD.encode([0u8, 1, 2]);
		assert!(decode_matrix(&encoded).is_err());
	}

	#[test]
	fn compress_roundtrip() {
		let original = b"the quick brown fox";
		let compressed = compress(original).unwrap();
		assert!(is_gzipped(&compressed));
		assert_eq!(decompress(&compressed).unwrap(), original);
	}

	#[test]
	fn save_load_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let (catalog, matrix) = sample();
		save(dir.path(), &catalog, &matrix).unwrap();
		assert!(dir.path().join(SNAPSHOT_FILE).exists());

		let (loaded_catalog, loaded_matrix) = load(dir.path()).unwrap();
		assert_eq!(loaded_catalog.movies(), catalog.movies());
		assert_eq!(loaded_matrix, matrix);
		// derived lookups are rebuilt at load time
		assert_eq!(loaded_catalog.lookup_by_title("Heat (1995)"), Some(1));
	}

	#[test]
	fn load_missing_snapshot() {
		let dir = tempfile::tempdir().unwrap();
		assert!(matches!(load(dir.path()), Err(EngineError::SnapshotMissing)));
	}

	#[test]
	fn load_garbage_is_corruption() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(SNAPSHOT_FILE), b"not a snapshot").unwrap();
		assert!(matches!(load(dir.path()), Err(EngineError::Corruption(_))));
	}

	#[test]
	fn load_rejects_wrong_version() {
		let dir = tempfile::tempdir().unwrap();
		let json = r#"{"version":99,"movies":[],"matrix":{"rows":0,"data":""}}"#;
		let compressed = compress(json.as_bytes()).unwrap();
		std::fs::write(dir.path().join(SNAPSHOT_FILE), compressed).unwrap();
		assert!(matches!(load(dir.path()), Err(EngineError::Corruption(_))));
	}

	#[test]
	fn load_rejects_row_count_mismatch() {
		let dir = tempfile::tempdir().unwrap();
		// one movie, but a 2x2 matrix
		let data = encode_matrix(&[1.0, 0.0, 0.0, 1.0]);
		let json = format!(
			r#"{{"version":1,"movies":[{{"id":1,"title":"Heat (1995)","genres":[]}}],"matrix":{{"rows":2,"data":"{}"}}}}"#,
			data
		);
		let compressed = compress(json.as_bytes()).unwrap();
		std::fs::write(dir.path().join(SNAPSHOT_FILE), compressed).unwrap();
		match load(dir.path()) {
			Err(EngineError::Corruption(msg)) => {
				assert!(msg.contains("row count mismatch"), "{}", msg);
			}
			other => panic!("expected Corruption, got {:?}", other),
		}
	}

	#[test]
	fn load_accepts_uncompressed_json() {
		// plain JSON is tolerated for hand-built fixtures
		let dir = tempfile::tempdir().unwrap();
		let json = r#"{"version":1,"movies":[],"matrix":{"rows":0,"data":""}}"#;
		std::fs::write(dir.path().join(SNAPSHOT_FILE), json).unwrap();
		let (catalog, matrix) = load(dir.path()).unwrap();
		assert!(catalog.is_empty());
		assert_eq!(matrix.rows(), 0);
	}
}
