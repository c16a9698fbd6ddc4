// ---------------------------------------------------------------------------
// Query Engine — search, recommendation, and detail lookup
// ---------------------------------------------------------------------------
//
// One immutable catalog + matrix pair answers every query. All methods take
// `&self` and nothing mutates after construction, so a single `Recommender`
// can be shared across worker threads (behind an `Arc`) with no locking.
// The only ordering requirement is that construction completes before the
// first query.
//
// "No such title", "no such id", and blank queries are ordinary empty
// results, never errors: they are routine client traffic.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;
use std::path::Path;

use tracing::info;

use crate::catalog::CatalogIndex;
use crate::error::EngineError;
use crate::features::TfidfFeatures;
use crate::similarity::SimilarityMatrix;
use crate::snapshot;
use crate::types::{Movie, ScoredMovie};

pub struct Recommender {
	catalog: CatalogIndex,
	matrix: SimilarityMatrix,
}

impl Recommender {
	/// Pair a catalog with its similarity matrix. The two must come from
	/// the same build; a row-count mismatch means mixed artifacts.
	pub fn new(catalog: CatalogIndex, matrix: SimilarityMatrix) -> Result<Self, EngineError> {
		if catalog.len() != matrix.rows() {
			return Err(EngineError::Corruption(format!(
				"row count mismatch: {} movies vs {} matrix rows",
				catalog.len(),
				matrix.rows()
			)));
		}
		Ok(Self { catalog, matrix })
	}

	/// Run the full build phase over an ordered movie list: TF-IDF
	/// features, then the pairwise similarity matrix, row-aligned with the
	/// catalog by construction.
	pub fn build(movies: Vec<Movie>) -> Self {
		let catalog = CatalogIndex::from_movies(movies);
		let documents = catalog.combined_documents();
		let features = TfidfFeatures::fit(&documents);
		let matrix = SimilarityMatrix::from_vectors(features.vectors());
		info!(
			movies = catalog.len(),
			vocabulary = features.vocabulary().len(),
			"built similarity index"
		);
		Self { catalog, matrix }
	}

	/// Persist the catalog + matrix pair.
	pub fn save(&self, dir: &Path) -> Result<(), EngineError> {
		snapshot::save(dir, &self.catalog, &self.matrix)
	}

	/// Load a previously built snapshot.
	pub fn load(dir: &Path) -> Result<Self, EngineError> {
		let (catalog, matrix) = snapshot::load(dir)?;
		Self::new(catalog, matrix)
	}

	pub fn catalog(&self) -> &CatalogIndex {
		&self.catalog
	}

	pub fn matrix(&self) -> &SimilarityMatrix {
		&self.matrix
	}

	/// Free-text search over titles and genre tags, case-insensitive.
	///
	/// Title matches come first (title is the stronger signal), then
	/// genre-only matches; each group keeps catalog order and a movie
	/// matching both ways appears once, in the title group. A blank query
	/// matches nothing rather than everything. Movies without genre tags
	/// never match on genre text.
	pub fn search(&self, query: &str, limit: usize) -> Vec<Movie> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() {
			return Vec::new();
		}

		let movies = self.catalog.movies();
		let mut matched = vec![false; movies.len()];
		let mut results = Vec::new();

		for (row, movie) in movies.iter().enumerate() {
			if movie.title.to_lowercase().contains(&needle) {
				matched[row] = true;
				results.push(movie.clone());
			}
		}
		for (row, movie) in movies.iter().enumerate() {
			if matched[row] {
				continue;
			}
			if movie
				.genres
				.iter()
				.any(|g| g.to_lowercase().contains(&needle))
			{
				results.push(movie.clone());
			}
		}

		results.truncate(limit);
		results
	}

	/// Top-`limit` most similar movies to an exactly matching title.
	///
	/// Unknown titles yield an empty result. The query movie itself is
	/// excluded by row index, so a different movie with an identical 1.0
	/// score still appears. Ties (including the all-zero tail) keep
	/// catalog order via the stable sort; zero-score movies are eligible
	/// results and trail in catalog order.
	pub fn recommend(&self, title: &str, limit: usize) -> Vec<Movie> {
		self.recommend_scored(title, limit)
			.into_iter()
			.map(|scored| scored.movie)
			.collect()
	}

	/// `recommend` with the ranking signal attached.
	pub fn recommend_scored(&self, title: &str, limit: usize) -> Vec<ScoredMovie> {
		let Some(row) = self.catalog.lookup_by_title(title) else {
			return Vec::new();
		};

		let scores = self.matrix.row(row);
		let mut ranked: Vec<(usize, f64)> = scores
			.iter()
			.enumerate()
			.filter(|(other, _)| *other != row)
			.map(|(other, &score)| (other, score))
			.collect();
		// Stable sort: equal scores keep catalog order.
		ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
		ranked.truncate(limit);

		ranked
			.into_iter()
			.map(|(other, score)| ScoredMovie {
				movie: self.catalog.row_at(other).clone(),
				score,
			})
			.collect()
	}

	/// Full record for one movie id, if it exists.
	pub fn get_details(&self, id: u32) -> Option<&Movie> {
		self.catalog
			.lookup_by_id(id)
			.map(|row| self.catalog.row_at(row))
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
