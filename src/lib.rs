// ---------------------------------------------------------------------------
// cinematch — content-based movie search and recommendation engine
// ---------------------------------------------------------------------------
//
// Build phase (offline, run once per dataset change): load the raw catalog
// CSVs, extract TF-IDF features from each movie's title + genres, compute
// the dense pairwise cosine-similarity matrix, persist both as one snapshot.
//
// Serving phase: load the snapshot read-only and answer substring search,
// top-N similar-movie, and by-id detail queries with no further mutation.
// ---------------------------------------------------------------------------

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod features;
pub mod query;
pub mod similarity;
pub mod snapshot;
pub mod types;

pub use catalog::CatalogIndex;
pub use dataset::DatasetPaths;
pub use error::EngineError;
pub use query::Recommender;
pub use similarity::SimilarityMatrix;
pub use types::{Movie, ScoredMovie};
