use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("{file}: missing required column '{column}'")]
	MissingColumn { file: String, column: String },
	#[error("{file}:{line}: {reason}")]
	InvalidRecord {
		file: String,
		line: usize,
		reason: String,
	},
	#[error("no snapshot found: run `cinematch build` first")]
	SnapshotMissing,
	#[error("snapshot corruption: {0}")]
	Corruption(String),
	#[error("serialization error: {0}")]
	Serialization(String),
}
