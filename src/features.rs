// ---------------------------------------------------------------------------
// Feature Extractor — TF-IDF over combined movie text
// ---------------------------------------------------------------------------
//
// Turns each movie's combined text (title + genres) into one dense
// L2-normalized TF-IDF row over a corpus-wide vocabulary. The vocabulary is
// the lexicographically sorted set of non-stopword terms, so the mapping from
// term to column is reproducible for a given corpus regardless of hash-map
// iteration order.
// ---------------------------------------------------------------------------

use std::collections::{HashMap, HashSet};

use tracing::debug;

// ---------------------------------------------------------------------------
// Stopwords
// ---------------------------------------------------------------------------

/// Common English function words excluded from the vocabulary.
/// Kept sorted so membership checks can binary-search.
const STOP_WORDS: &[&str] = &[
	"a", "about", "after", "all", "also", "an", "and", "any", "are", "as",
	"at", "be", "because", "been", "being", "but", "by", "can", "could",
	"did", "do", "does", "for", "from", "had", "has", "have", "he", "her",
	"his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "may",
	"might", "more", "most", "my", "no", "not", "of", "on", "only", "or",
	"other", "our", "out", "over", "shall", "she", "should", "so", "some",
	"such", "than", "that", "the", "their", "them", "then", "there", "they",
	"this", "to", "under", "up", "was", "we", "were", "what", "when",
	"where", "which", "who", "will", "with", "would", "you", "your",
];

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.binary_search(&token).is_ok()
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

/// Tokenize text for feature extraction: lowercase, split into maximal runs
/// of alphanumeric/underscore characters, drop single-character tokens and
/// stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
	text.to_lowercase()
		.chars()
		.map(|c| {
			if c.is_alphanumeric() || c == '_' {
				c
			} else {
				' '
			}
		})
		.collect::<String>()
		.split_whitespace()
		.filter(|t| t.chars().count() >= 2)
		.filter(|t| !is_stop_word(t))
		.map(|t| t.to_string())
		.collect()
}

// ---------------------------------------------------------------------------
// TfidfFeatures
// ---------------------------------------------------------------------------

/// TF-IDF representation of a document corpus: one vocabulary shared by all
/// rows, frozen once built.
#[derive(Debug, Clone)]
pub struct TfidfFeatures {
	/// Sorted terms; index is the column in every row vector.
	vocabulary: Vec<String>,
	/// term -> column
	term_index: HashMap<String, usize>,
	/// Smoothed inverse document frequency per column.
	idf: Vec<f64>,
	/// One dense L2-normalized row per document, in input order.
	vectors: Vec<Vec<f64>>,
}

impl TfidfFeatures {
	/// Build the vocabulary, IDF weights, and per-document vectors in one
	/// pass over the corpus.
	///
	/// Weighting: raw term count scaled by `ln((1 + N) / (1 + df)) + 1`,
	/// rows L2-normalized. An empty corpus yields an empty vocabulary; a
	/// document with no surviving tokens yields an all-zero row.
	pub fn fit(documents: &[String]) -> Self {
		if documents.is_empty() {
			return Self {
				vocabulary: Vec::new(),
				term_index: HashMap::new(),
				idf: Vec::new(),
				vectors: Vec::new(),
			};
		}

		let tokenized: Vec<Vec<String>> =
			documents.iter().map(|d| tokenize(d)).collect();

		// Document frequency per term.
		let mut doc_freq: HashMap<&str, usize> = HashMap::new();
		for tokens in &tokenized {
			let unique: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
			for term in unique {
				*doc_freq.entry(term).or_insert(0) += 1;
			}
		}

		// Sorted vocabulary fixes every term's column deterministically.
		let mut vocabulary: Vec<String> =
			doc_freq.keys().map(|t| t.to_string()).collect();
		vocabulary.sort();

		let term_index: HashMap<String, usize> = vocabulary
			.iter()
			.enumerate()
			.map(|(i, t)| (t.clone(), i))
			.collect();

		let n = documents.len() as f64;
		let idf: Vec<f64> = vocabulary
			.iter()
			.map(|term| {
				let df = doc_freq[term.as_str()] as f64;
				((1.0 + n) / (1.0 + df)).ln() + 1.0
			})
			.collect();

		let mut vectors = Vec::with_capacity(tokenized.len());
		for tokens in &tokenized {
			let mut counts: HashMap<&str, usize> = HashMap::new();
			for token in tokens {
				*counts.entry(token.as_str()).or_insert(0) += 1;
			}

			let mut row = vec![0.0; vocabulary.len()];
			for (term, count) in counts {
				let col = term_index[term];
				row[col] = count as f64 * idf[col];
			}

			let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
			if norm > 0.0 {
				for v in &mut row {
					*v /= norm;
				}
			}
			vectors.push(row);
		}

		debug!(
			documents = documents.len(),
			vocabulary = vocabulary.len(),
			"fitted tf-idf features"
		);

		Self {
			vocabulary,
			term_index,
			idf,
			vectors,
		}
	}

	pub fn vocabulary(&self) -> &[String] {
		&self.vocabulary
	}

	pub fn idf(&self, term: &str) -> Option<f64> {
		self.term_index.get(term).map(|&i| self.idf[i])
	}

	/// Dense rows, one per input document, in input order.
	pub fn vectors(&self) -> &[Vec<f64>] {
		&self.vectors
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stop_words_are_sorted() {
		// binary_search relies on this
		assert!(STOP_WORDS.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn tokenize_lowercases_and_splits() {
		assert_eq!(
			tokenize("Toy Story (1995)"),
			vec!["toy", "story", "1995"]
		);
	}

	#[test]
	fn tokenize_drops_short_tokens() {
		// "2" is a single character
		assert_eq!(tokenize("Toy Story 2"), vec!["toy", "story"]);
	}

	#[test]
	fn tokenize_drops_stopwords() {
		assert_eq!(
			tokenize("The Silence of the Lambs"),
			vec!["silence", "lambs"]
		);
	}

	#[test]
	fn tokenize_empty_text() {
		assert!(tokenize("").is_empty());
		assert!(tokenize("   ").is_empty());
	}

	#[test]
	fn fit_empty_corpus() {
		let features = TfidfFeatures::fit(&[]);
		assert!(features.vocabulary().is_empty());
		assert!(features.vectors().is_empty());
	}

	#[test]
	fn fit_vocabulary_is_sorted_and_shared() {
		let docs = vec![
			"Heat Action Crime".to_string(),
			"Toy Story Animation Comedy".to_string(),
		];
		let features = TfidfFeatures::fit(&docs);
		let vocab = features.vocabulary();
		assert!(vocab.windows(2).all(|w| w[0] < w[1]));
		assert_eq!(features.vectors().len(), 2);
		for row in features.vectors() {
			assert_eq!(row.len(), vocab.len());
		}
	}

	#[test]
	fn fit_is_deterministic() {
		let docs = vec![
			"Toy Story Animation Comedy".to_string(),
			"Toy Story 2 Animation Comedy".to_string(),
			"Heat Action Crime".to_string(),
		];
		let a = TfidfFeatures::fit(&docs);
		let b = TfidfFeatures::fit(&docs);
		assert_eq!(a.vocabulary(), b.vocabulary());
		assert_eq!(a.vectors(), b.vectors());
	}

	#[test]
	fn fit_rows_are_unit_length() {
		let docs = vec![
			"Toy Story Animation Comedy".to_string(),
			"Heat Action Crime".to_string(),
		];
		let features = TfidfFeatures::fit(&docs);
		for row in features.vectors() {
			let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
			assert!((norm - 1.0).abs() < 1e-12);
		}
	}

	#[test]
	fn fit_empty_document_yields_zero_row() {
		let docs = vec!["Toy Story".to_string(), String::new()];
		let features = TfidfFeatures::fit(&docs);
		assert!(features.vectors()[1].iter().all(|&v| v == 0.0));
	}

	#[test]
	fn idf_weighs_rare_terms_above_common_ones() {
		let docs = vec![
			"toy story animation".to_string(),
			"toy soldiers animation".to_string(),
			"heat animation".to_string(),
		];
		let features = TfidfFeatures::fit(&docs);
		// "animation" appears everywhere, "heat" once
		let common = features.idf("animation").unwrap();
		let rare = features.idf("heat").unwrap();
		assert!(rare > common);
		// smoothed idf of an everywhere-term is exactly 1
		assert!((common - 1.0).abs() < 1e-12);
	}
}
