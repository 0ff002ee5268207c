use anyhow::{bail, Context, Result};
use chess_normalizer::config::Config;
use chess_normalizer::constants;
use chess_normalizer::logging;
use chess_normalizer::metrics;
use chess_normalizer::Pipeline;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chess_normalizer")]
#[command(about = "Normalize chess.com and lichess game archives into one record schema")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw archive file and write NDJSON records
    Normalize {
        /// Source of the archive. Available: chesscom, lichess
        #[arg(long)]
        source: String,
        /// Raw archive: PGN for chesscom, NDJSON for lichess
        #[arg(long)]
        input: PathBuf,
        /// Config file with identity, timezone and policy settings
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        /// Overrides the configured identity
        #[arg(long)]
        identity: Option<String>,
        /// Where to write records; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List supported sources
    Sources,
}

fn load_config(path: &Path, identity: Option<String>) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        warn!("Config file {} not found; using defaults", path.display());
        Config::new(identity.clone().unwrap_or_default())
    };

    let mut config = config.with_env_overrides();
    if let Some(identity) = identity {
        config.identity = identity;
    }
    Ok(config)
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();
    metrics::register_all_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize {
            source,
            input,
            config,
            identity,
            output,
        } => {
            if !constants::get_supported_sources().contains(&source.as_str()) {
                bail!(
                    "unknown source '{}'; available: {}",
                    source,
                    constants::get_supported_sources().join(", ")
                );
            }
            let config = load_config(&config, identity)?;
            let ctx = config.context().context("invalid configuration")?;
            let source_id = constants::source_name_to_internal(&source);

            let bytes = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let span = tracing::info_span!("normalize", source = %source_id);
            let _enter = span.enter();

            let result = Pipeline::new().run(&source_id, &bytes, &ctx)?;
            match output {
                Some(path) => {
                    let file = fs::File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    Pipeline::write_ndjson(&result.records, BufWriter::new(file))?;
                    info!("Wrote {} records to {}", result.records.len(), path.display());
                }
                None => Pipeline::write_ndjson(&result.records, BufWriter::new(io::stdout().lock()))?,
            }

            eprintln!("\n📊 Normalization results for {}:", source);
            eprintln!("   Total games: {}", result.total_games);
            eprintln!("   Normalized: {}", result.records.len());
            eprintln!("   Dropped: {}", result.dropped);
            eprintln!("   Errors: {}", result.errors.len());
            for error in result.errors.iter().take(10) {
                eprintln!("     - {}", error);
            }
        }
        Commands::Sources => {
            for source in constants::get_supported_sources() {
                println!("{} ({})", source, constants::source_name_to_internal(source));
            }
        }
    }

    Ok(())
}
