//! SPIUnet scraper CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spiunet::{
    error::{AppError, Result},
    models::{Config, FieldSelection, RunContext},
    pipeline::{self, ScrapeJob},
    services::{FieldCatalog, PageClass},
    session::Credentials,
    storage::IdentifierSource,
    utils::log::LogLevel,
};

/// SPIUnet - Property registry scraper
#[derive(Parser, Debug)]
#[command(
    name = "spiunet",
    version,
    about = "Retrieves SPIUnet property records by RIP"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "spiunet.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and scrape records into a CSV file
    Scrape(ScrapeArgs),

    /// Extract fields from a saved record page and print them as JSON
    Extract {
        /// Saved HTML page
        page: PathBuf,

        /// Identifier to put in the record
        #[arg(long, default_value = "")]
        rip: String,

        /// Fields to extract: `*` or a comma-separated list
        #[arg(short, long, default_value = "*")]
        fields: String,
    },

    /// List the field catalog
    Fields,

    /// Validate the configuration file
    Validate,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// Header-less CSV file with one identifier per row
    #[arg(long, conflicts_with = "rip", required_unless_present = "rip")]
    rips: Option<PathBuf>,

    /// Identifier to scrape (repeatable)
    #[arg(long)]
    rip: Vec<String>,

    /// Fields to extract: `*` or a comma-separated list
    #[arg(short, long, default_value = "*")]
    fields: String,

    /// Reduce identifiers to their digits before use
    #[arg(long)]
    normalize: bool,

    /// Result file (default: timestamped file in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Registry user
    #[arg(long, env = "SPIUNET_USER")]
    user: String,

    /// Registry password
    #[arg(long, env = "SPIUNET_PASSWORD", hide_env_values = true)]
    password: String,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        LogLevel::from_name(configured)
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_filter().as_str()),
    )
    .format_timestamp_secs()
    .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|config| config.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => {
            log::debug!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Scrape(args) => {
            config.validate()?;
            let identifiers = match args.rips {
                Some(path) => IdentifierSource::File(path),
                None => IdentifierSource::List(args.rip),
            };
            let job = ScrapeJob {
                identifiers,
                selection: args.fields.parse()?,
                normalize: args.normalize,
                output: args.output,
            };

            let mut context = RunContext::from_config(&config);
            context.quiet = args.quiet;
            let credentials = Credentials::new(args.user, args.password);

            let report = pipeline::run_scrape(&config, &context, &credentials, job).await?;
            log::info!(
                "{} rows written to {}",
                report.records.len(),
                report.output.display()
            );
        }

        Command::Extract { page, rip, fields } => {
            let selection: FieldSelection = fields.parse()?;
            let (class, record) = pipeline::run_extract(&config, &page, &rip, &selection)?;
            if let PageClass::NotFound(marker) = class {
                log::warn!("Page is an error page: {}", marker);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&pipeline::record_json(&record))?
            );
        }

        Command::Fields => {
            let catalog = FieldCatalog::new(config.fields.clone());
            if catalog.is_empty() {
                return Err(AppError::config("No fields defined"));
            }
            for field in catalog.fields() {
                println!(
                    "{:<20} {:<6} {:<7} {:?}",
                    field.name,
                    field.traversal_rule.to_string(),
                    field.type_hint.to_string(),
                    field.anchor_label
                );
            }
        }

        Command::Validate => {
            pipeline::run_validate(&cli.config)?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
