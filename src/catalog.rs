// ---------------------------------------------------------------------------
// Catalog Index — ordered movie table with derived lookups
// ---------------------------------------------------------------------------
//
// Holds the canonical ordered movie list plus title→row and id→row maps,
// built once and read-only thereafter. Row order here is the row order of
// the similarity matrix; any dataset change rebuilds both together.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use crate::types::Movie;

/// Immutable, ordered collection of movies with constant-time lookups.
///
/// Duplicate titles (and duplicate ids, which a well-formed dataset never
/// has) resolve first-wins: the earliest row keeps the lookup key, later
/// rows stay addressable by row index only.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
	movies: Vec<Movie>,
	by_title: HashMap<String, usize>,
	by_id: HashMap<u32, usize>,
}

impl CatalogIndex {
	pub fn from_movies(movies: Vec<Movie>) -> Self {
		let mut by_title = HashMap::with_capacity(movies.len());
		let mut by_id = HashMap::with_capacity(movies.len());
		for (row, movie) in movies.iter().enumerate() {
			by_title.entry(movie.title.clone()).or_insert(row);
			by_id.entry(movie.id).or_insert(row);
		}
		Self {
			movies,
			by_title,
			by_id,
		}
	}

	pub fn len(&self) -> usize {
		self.movies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.movies.is_empty()
	}

	/// Exact, case-sensitive title lookup.
	pub fn lookup_by_title(&self, title: &str) -> Option<usize> {
		self.by_title.get(title).copied()
	}

	pub fn lookup_by_id(&self, id: u32) -> Option<usize> {
		self.by_id.get(&id).copied()
	}

	pub fn row_at(&self, row: usize) -> &Movie {
		&self.movies[row]
	}

	pub fn movies(&self) -> &[Movie] {
		&self.movies
	}

	/// Feature-extractor input: one combined-text document per row, in
	/// row order.
	pub fn combined_documents(&self) -> Vec<String> {
		self.movies.iter().map(|m| m.combined_features()).collect()
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	fn movie(id: u32, title: &str) -> Movie {
		Movie {
			id,
			title: title.to_string(),
			genres: Vec::new(),
			tmdb_id: None,
			avg_rating: None,
		}
	}

	#[test]
	fn lookup_by_title_and_id() {
		let catalog = CatalogIndex::from_movies(vec![
			movie(1, "Toy Story (1995)"),
			movie(2, "Heat (1995)"),
		]);
		assert_eq!(catalog.lookup_by_title("Heat (1995)"), Some(1));
		assert_eq!(catalog.lookup_by_id(1), Some(0));
		assert_eq!(catalog.row_at(0).title, "Toy Story (1995)");
	}

	#[test]
	fn title_lookup_is_case_sensitive() {
		let catalog = CatalogIndex::from_movies(vec![movie(1, "Heat (1995)")]);
		assert_eq!(catalog.lookup_by_title("heat (1995)"), None);
	}

	#[test]
	fn duplicate_titles_keep_first_row() {
		let catalog = CatalogIndex::from_movies(vec![
			movie(1, "Hamlet"),
			movie(2, "Hamlet"),
		]);
		assert_eq!(catalog.lookup_by_title("Hamlet"), Some(0));
		// the later duplicate is still addressable by row
		assert_eq!(catalog.row_at(1).id, 2);
	}

	#[test]
	fn unknown_keys_return_none() {
		let catalog = CatalogIndex::from_movies(vec![movie(1, "Heat (1995)")]);
		assert_eq!(catalog.lookup_by_title("no such title"), None);
		assert_eq!(catalog.lookup_by_id(99), None);
	}

	#[test]
	fn combined_documents_follow_row_order() {
		let catalog = CatalogIndex::from_movies(vec![
			movie(2, "Heat (1995)"),
			movie(1, "Toy Story (1995)"),
		]);
		let docs = catalog.combined_documents();
		assert_eq!(docs[0], "Heat (1995)");
		assert_eq!(docs[1], "Toy Story (1995)");
	}
}
