use serde::{Deserialize, Serialize};

/// One catalog entry, keyed by the dataset's `movieId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
	pub id: u32,
	pub title: String,
	pub genres: Vec<String>,
	/// TMDB identifier joined from `links.csv`; only the presentation
	/// layer interprets it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tmdb_id: Option<u32>,
	/// Mean of all rating events for this movie; `None` when unrated.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avg_rating: Option<f64>,
}

impl Movie {
	/// Text fed to the feature extractor: title plus space-joined genres.
	/// Never displayed.
	pub fn combined_features(&self) -> String {
		if self.genres.is_empty() {
			self.title.clone()
		} else {
			format!("{} {}", self.title, self.genres.join(" "))
		}
	}
}

/// A recommendation with its ranking signal attached, for callers that
/// ask for scores.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMovie {
	pub movie: Movie,
	pub score: f64,
}
