// ---------------------------------------------------------------------------
// Catalog Loader — MovieLens-style flat CSV files
// ---------------------------------------------------------------------------
//
// Reads the build-phase input contract: `movies.csv` (required), plus
// optional `links.csv` (TMDB join) and `ratings.csv` (per-movie mean
// rating). Columns are resolved by header name, never by position. Any
// unreadable file, missing required column, or unparseable row is fatal to
// the build; no partial catalog is ever produced.
//
// The parser covers the RFC 4180 subset MovieLens actually uses: quoted
// fields with embedded commas and doubled quotes, one record per line.
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::EngineError;
use crate::types::Movie;

/// Sentinel the dataset uses for a movie without genre tags.
const NO_GENRES: &str = "(no genres listed)";

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Locations of the raw dataset files. `links` and `ratings` are optional
/// signals; the catalog builds without them.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
	pub movies: PathBuf,
	pub links: Option<PathBuf>,
	pub ratings: Option<PathBuf>,
}

impl DatasetPaths {
	/// Conventional layout inside one extracted dataset directory.
	/// Optional files that are absent on disk are skipped, not errors.
	pub fn from_dir(dir: &Path) -> Self {
		let optional = |name: &str| {
			let path = dir.join(name);
			path.exists().then_some(path)
		};
		Self {
			movies: dir.join("movies.csv"),
			links: optional("links.csv"),
			ratings: optional("ratings.csv"),
		}
	}
}

// ---------------------------------------------------------------------------
// CSV primitives
// ---------------------------------------------------------------------------

/// Split one CSV record into fields, honoring double-quoted fields with
/// embedded commas and `""` escapes.
fn parse_record(line: &str) -> Result<Vec<String>, String> {
	let mut fields = Vec::new();
	let mut field = String::new();
	let mut chars = line.chars().peekable();
	let mut in_quotes = false;

	while let Some(c) = chars.next() {
		match c {
			'"' if in_quotes => {
				if chars.peek() == Some(&'"') {
					chars.next();
					field.push('"');
				} else {
					in_quotes = false;
				}
			}
			'"' => in_quotes = true,
			',' if !in_quotes => {
				fields.push(std::mem::take(&mut field));
			}
			_ => field.push(c),
		}
	}

	if in_quotes {
		return Err("unterminated quoted field".to_string());
	}
	fields.push(field);
	Ok(fields)
}

/// Header-resolved column positions for one CSV file.
struct Header {
	file: String,
	columns: HashMap<String, usize>,
}

impl Header {
	fn parse(file: &str, line: &str) -> Result<Self, EngineError> {
		let fields = parse_record(line).map_err(|reason| EngineError::InvalidRecord {
			file: file.to_string(),
			line: 1,
			reason,
		})?;
		let columns = fields
			.into_iter()
			.enumerate()
			.map(|(i, name)| (name.trim().to_string(), i))
			.collect();
		Ok(Self {
			file: file.to_string(),
			columns,
		})
	}

	fn require(&self, column: &str) -> Result<usize, EngineError> {
		self.columns
			.get(column)
			.copied()
			.ok_or_else(|| EngineError::MissingColumn {
				file: self.file.clone(),
				column: column.to_string(),
			})
	}
}

/// Iterate the data rows of a CSV file, handing each parsed record (and its
/// 1-based line number) to `handle`. Blank lines are skipped.
fn for_each_record<F>(path: &Path, mut handle: F) -> Result<(), EngineError>
where
	F: FnMut(usize, Vec<String>) -> Result<(), EngineError>,
{
	let file = path.display().to_string();
	let reader = BufReader::new(File::open(path)?);
	for (idx, line) in reader.lines().enumerate().skip(1) {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}
		let record = parse_record(&line).map_err(|reason| EngineError::InvalidRecord {
			file: file.clone(),
			line: idx + 1,
			reason,
		})?;
		handle(idx + 1, record)?;
	}
	Ok(())
}

fn read_header(path: &Path) -> Result<Header, EngineError> {
	let file = path.display().to_string();
	let mut first_line = String::new();
	BufReader::new(File::open(path)?).read_line(&mut first_line)?;
	Header::parse(&file, first_line.trim_end_matches(['\r', '\n']))
}

fn field<'a>(
	record: &'a [String],
	col: usize,
	file: &str,
	line: usize,
) -> Result<&'a str, EngineError> {
	record
		.get(col)
		.map(|s| s.as_str())
		.ok_or_else(|| EngineError::InvalidRecord {
			file: file.to_string(),
			line,
			reason: format!("record has {} fields, column {} required", record.len(), col + 1),
		})
}

fn invalid(file: &str, line: usize, reason: String) -> EngineError {
	EngineError::InvalidRecord {
		file: file.to_string(),
		line,
		reason,
	}
}

// ---------------------------------------------------------------------------
// File loaders
// ---------------------------------------------------------------------------

/// Load the movie table in file order. Genres are pipe-delimited; the
/// "(no genres listed)" sentinel maps to an empty list.
pub fn load_movies(path: &Path) -> Result<Vec<Movie>, EngineError> {
	let file = path.display().to_string();
	let header = read_header(path)?;
	let id_col = header.require("movieId")?;
	let title_col = header.require("title")?;
	let genres_col = header.require("genres")?;

	let mut movies = Vec::new();
	for_each_record(path, |line, record| {
		let id: u32 = field(&record, id_col, &file, line)?
			.parse()
			.map_err(|_| invalid(&file, line, "movieId is not an integer".to_string()))?;
		let title = field(&record, title_col, &file, line)?.to_string();
		let raw_genres = field(&record, genres_col, &file, line)?;
		let genres = if raw_genres == NO_GENRES || raw_genres.is_empty() {
			Vec::new()
		} else {
			raw_genres.split('|').map(|g| g.to_string()).collect()
		};
		movies.push(Movie {
			id,
			title,
			genres,
			tmdb_id: None,
			avg_rating: None,
		});
		Ok(())
	})?;
	Ok(movies)
}

/// Load the movieId → tmdbId join. Rows with an empty tmdbId are skipped.
pub fn load_links(path: &Path) -> Result<HashMap<u32, u32>, EngineError> {
	let file = path.display().to_string();
	let header = read_header(path)?;
	let id_col = header.require("movieId")?;
	let tmdb_col = header.require("tmdbId")?;

	let mut links = HashMap::new();
	for_each_record(path, |line, record| {
		let id: u32 = field(&record, id_col, &file, line)?
			.parse()
			.map_err(|_| invalid(&file, line, "movieId is not an integer".to_string()))?;
		let raw_tmdb = field(&record, tmdb_col, &file, line)?;
		if raw_tmdb.is_empty() {
			return Ok(());
		}
		let tmdb: u32 = raw_tmdb
			.parse()
			.map_err(|_| invalid(&file, line, "tmdbId is not an integer".to_string()))?;
		links.entry(id).or_insert(tmdb);
		Ok(())
	})?;
	Ok(links)
}

/// Aggregate the rating events into a per-movie mean.
pub fn load_ratings(path: &Path) -> Result<HashMap<u32, f64>, EngineError> {
	let file = path.display().to_string();
	let header = read_header(path)?;
	let id_col = header.require("movieId")?;
	let rating_col = header.require("rating")?;

	let mut sums: HashMap<u32, (f64, u64)> = HashMap::new();
	for_each_record(path, |line, record| {
		let id: u32 = field(&record, id_col, &file, line)?
			.parse()
			.map_err(|_| invalid(&file, line, "movieId is not an integer".to_string()))?;
		let rating: f64 = field(&record, rating_col, &file, line)?
			.parse()
			.map_err(|_| invalid(&file, line, "rating is not a number".to_string()))?;
		let entry = sums.entry(id).or_insert((0.0, 0));
		entry.0 += rating;
		entry.1 += 1;
		Ok(())
	})?;

	Ok(sums
		.into_iter()
		.map(|(id, (sum, count))| (id, sum / count as f64))
		.collect())
}

// ---------------------------------------------------------------------------
// Dataset assembly
// ---------------------------------------------------------------------------

/// Load the full dataset: the ordered movie table joined with whatever
/// auxiliary signals are present on disk.
pub fn load_dataset(paths: &DatasetPaths) -> Result<Vec<Movie>, EngineError> {
	let mut movies = load_movies(&paths.movies)?;

	if let Some(links_path) = &paths.links {
		let links = load_links(links_path)?;
		for movie in &mut movies {
			movie.tmdb_id = links.get(&movie.id).copied();
		}
	}

	if let Some(ratings_path) = &paths.ratings {
		let ratings = load_ratings(ratings_path)?;
		for movie in &mut movies {
			movie.avg_rating = ratings.get(&movie.id).copied();
		}
	}

	info!(movies = movies.len(), "loaded dataset");
	Ok(movies)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
