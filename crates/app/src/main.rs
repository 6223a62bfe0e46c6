use chrono::Utc;
use clap::{Parser, Subcommand};
use pdf_vector_core::{
    discover_pdf_files, HashingEmbedder, PipelineConfig, RuntimeEstimate, VectorDatabase,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pdf-vector", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Root folder holding all databases
    #[arg(long, default_value = "databases")]
    database_root: PathBuf,

    /// Embedding dimension
    #[arg(long, default_value = "384")]
    dimension: usize,

    /// Enable detailed progress messages
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build a new database from a folder of PDFs.
    Create {
        /// Folder that contains PDFs recursively.
        #[arg(long)]
        folder: PathBuf,
        /// Database name.
        #[arg(long, default_value = "default")]
        name: String,
        /// Drop near-duplicate vectors during ingestion.
        #[arg(long, default_value_t = false)]
        dedup: bool,
    },
    /// Query an existing database.
    Search {
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long)]
        query: String,
        /// Number of results to return.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },
    /// Deduplicate an existing database in place.
    Dedup {
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// List the chunks stored in a database.
    Display {
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// Estimate processing time and memory for a folder of PDFs.
    Estimate {
        #[arg(long)]
        folder: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let base_config = PipelineConfig {
        database_root: cli.database_root.clone(),
        verbose: cli.verbose,
        ..PipelineConfig::default()
    };
    let embedder = HashingEmbedder {
        dimension: cli.dimension,
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "pdf-vector boot"
    );

    match cli.command {
        Command::Create {
            folder,
            name,
            dedup,
        } => {
            let config = PipelineConfig {
                database_name: name,
                ..base_config
            };
            let extractor = pdf_vector_core::LopdfExtractor;
            let (db, report) =
                VectorDatabase::ingest(&folder, &extractor, &embedder, &config, dedup)
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped pdf");
            }

            db.save(&config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!(
                "{} documents, {} pages, {} chunks ({} vectors kept), {} skipped",
                report.documents,
                report.pages,
                report.chunks,
                report.kept_vectors,
                report.skipped_files.len()
            );
        }
        Command::Search { name, query, top_k } => {
            let config = PipelineConfig {
                database_name: name,
                ..base_config
            };
            let db = VectorDatabase::load(&embedder, &config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let hits = db
                .search(&embedder, &query, top_k)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if hits.is_empty() {
                println!("no results");
            }
            for (rank, hit) in hits.iter().enumerate() {
                println!("\n{}. similarity {:.2}", rank + 1, hit.score);
                println!("   pdf: {}", hit.pdf_path);
                println!("   page: {}", hit.page_number);
                println!("   excerpt: {}", excerpt(&hit.text, config.max_display_chars));
            }
        }
        Command::Dedup { name } => {
            let config = PipelineConfig {
                database_name: name,
                ..base_config
            };
            let mut db = VectorDatabase::load(&embedder, &config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let report = db
                .deduplicate(&embedder, &config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            db.save(&config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!(
                "{} unique chunks kept out of {}",
                report.after, report.before
            );
        }
        Command::Display { name } => {
            let config = PipelineConfig {
                database_name: name,
                ..base_config
            };
            let db = VectorDatabase::load(&embedder, &config)
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if db.metadata().is_empty() {
                println!("database is empty");
            }
            for document in db.metadata().documents() {
                println!("\n{} ({} chunks)", document.path, document.chunks.len());
                for chunk in &document.chunks {
                    println!(
                        "  [{}] page {} position {}: {}",
                        chunk.chunk_id,
                        chunk.page_number,
                        chunk.position_in_page,
                        excerpt(&chunk.text, 80)
                    );
                }
            }
        }
        Command::Estimate { folder } => {
            let files = discover_pdf_files(&folder);
            let projection = RuntimeEstimate::default().project(&files);
            println!(
                "{} files, {:.1} MB total; ~{:.0} pages, ~{:.1} s, ~{:.1} MB memory",
                files.len(),
                projection.total_mb,
                projection.estimated_pages,
                projection.estimated_seconds,
                projection.estimated_memory_mb
            );
        }
    }

    Ok(())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}
