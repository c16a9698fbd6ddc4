use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cinematch::{dataset, DatasetPaths, EngineError, Recommender};

#[derive(Parser)]
#[command(
	name = "cinematch",
	about = "Content-based movie search and recommendation engine",
	version
)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Process a raw dataset directory into a query snapshot.
	Build {
		/// Directory holding movies.csv (and optionally links.csv,
		/// ratings.csv).
		#[arg(long, env = "CINEMATCH_DATA_DIR", default_value = "./data/ml-latest-small")]
		data_dir: PathBuf,
		#[arg(long, env = "CINEMATCH_SNAPSHOT_DIR", default_value = "./data/snapshot")]
		out_dir: PathBuf,
	},
	/// Search the catalog by title or genre substring.
	Search {
		query: String,
		#[arg(long, default_value_t = 10)]
		limit: usize,
		#[arg(long, env = "CINEMATCH_SNAPSHOT_DIR", default_value = "./data/snapshot")]
		snapshot_dir: PathBuf,
	},
	/// Recommend the movies most similar to an exact title.
	Recommend {
		title: String,
		#[arg(long, default_value_t = 10)]
		limit: usize,
		/// Include similarity scores in the output.
		#[arg(long)]
		scores: bool,
		#[arg(long, env = "CINEMATCH_SNAPSHOT_DIR", default_value = "./data/snapshot")]
		snapshot_dir: PathBuf,
	},
	/// Print the full record for one movie id.
	Details {
		id: u32,
		#[arg(long, env = "CINEMATCH_SNAPSHOT_DIR", default_value = "./data/snapshot")]
		snapshot_dir: PathBuf,
	},
}

fn main() {
	// Logs go to stderr so stdout stays machine-readable JSON.
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	if let Err(e) = run(Cli::parse()) {
		tracing::error!("{}", e);
		std::process::exit(1);
	}
}

fn run(cli: Cli) -> Result<(), EngineError> {
	match cli.command {
		Command::Build { data_dir, out_dir } => {
			let movies = dataset::load_dataset(&DatasetPaths::from_dir(&data_dir))?;
			let recommender = Recommender::build(movies);
			recommender.save(&out_dir)?;
			tracing::info!(
				movies = recommender.catalog().len(),
				out = %out_dir.display(),
				"build complete"
			);
		}
		Command::Search {
			query,
			limit,
			snapshot_dir,
		} => {
			let recommender = Recommender::load(&snapshot_dir)?;
			print_json(&recommender.search(&query, limit))?;
		}
		Command::Recommend {
			title,
			limit,
			scores,
			snapshot_dir,
		} => {
			let recommender = Recommender::load(&snapshot_dir)?;
			if scores {
				print_json(&recommender.recommend_scored(&title, limit))?;
			} else {
				print_json(&recommender.recommend(&title, limit))?;
			}
		}
		Command::Details { id, snapshot_dir } => {
			let recommender = Recommender::load(&snapshot_dir)?;
			print_json(&recommender.get_details(id))?;
		}
	}
	Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), EngineError> {
	let json = serde_json::to_string_pretty(value)
		.map_err(|e| EngineError::Serialization(e.to_string()))?;
	println!("{}", json);
	Ok(())
}
