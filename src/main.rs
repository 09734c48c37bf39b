//! clickproof command-line interface.
//!
//! ```text
//! clickproof ingest <manifest> <images> <output> [--config FILE] [--resize stretch|contain] [--format webp|png] [-v]
//! clickproof check --corpus FILE --id ID --x X --y Y
//! clickproof init-config
//! ```

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::main()
}

// The CLI is native-only; the library is used directly on the web.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;

    use clap::{Parser, Subcommand};

    use clickproof::config::{IngestConfig, SessionConfig};
    use clickproof::corpus::CorpusStore;
    use clickproof::geometry::Point;
    use clickproof::ingest::{Ingestor, OutputFormat, ResizePolicy};
    use clickproof::session::Session;

    type CliError = Box<dyn std::error::Error>;
    type CliResult<T> = Result<T, CliError>;

    #[derive(Parser)]
    #[command(name = "clickproof")]
    #[command(about = "Build and check image-click challenge corpora")]
    #[command(version)]
    struct Cli {
        /// Enable debug logging.
        #[arg(short, long, global = true)]
        verbose: bool,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Normalize annotated images into a challenge corpus.
        Ingest {
            /// Annotation manifest exported as VIA CSV or JSON.
            manifest: PathBuf,

            /// Directory containing the source images.
            images: PathBuf,

            /// Directory for normalized images and the corpus file.
            output: PathBuf,

            /// Configuration file (defaults to the user config directory).
            #[arg(long)]
            config: Option<PathBuf>,

            /// Resize policy: stretch or contain.
            #[arg(long)]
            resize: Option<ResizePolicy>,

            /// Output image format: webp or png.
            #[arg(long)]
            format: Option<OutputFormat>,

            /// Abort on the first file that fails.
            #[arg(long)]
            stop_on_error: bool,
        },

        /// Verify one canonical click against a challenge and print the response.
        Check {
            /// Corpus file written by `ingest`.
            #[arg(long)]
            corpus: PathBuf,

            /// Challenge id.
            #[arg(long)]
            id: String,

            /// Canonical x coordinate.
            #[arg(long)]
            x: f64,

            /// Canonical y coordinate.
            #[arg(long)]
            y: f64,

            /// Hostname reported in the response.
            #[arg(long, default_value = "localhost")]
            hostname: String,
        },

        /// Write a default configuration file to the user config directory.
        InitConfig,
    }

    pub fn main() -> ExitCode {
        let cli = Cli::parse();

        let result = match cli.command {
            Commands::Ingest {
                manifest,
                images,
                output,
                config,
                resize,
                format,
                stop_on_error,
            } => load_config(config.as_deref()).and_then(|mut ingest_config| {
                init_logging(&ingest_config, cli.verbose);
                if let Some(resize) = resize {
                    ingest_config.resize_policy = resize;
                }
                if let Some(format) = format {
                    ingest_config.output_format = format;
                }
                if stop_on_error {
                    ingest_config.continue_on_error = false;
                }
                run_ingest(ingest_config, &manifest, &images, &output)
            }),
            Commands::Check {
                corpus,
                id,
                x,
                y,
                hostname,
            } => {
                init_logging(&IngestConfig::default(), cli.verbose);
                run_check(&corpus, &id, Point::new(x, y), hostname)
            }
            Commands::InitConfig => {
                init_logging(&IngestConfig::default(), cli.verbose);
                run_init_config()
            }
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        }
    }

    /// Config level first, `-v` over it, `RUST_LOG` over both.
    fn init_logging(config: &IngestConfig, verbose: bool) {
        let level = if verbose {
            log::LevelFilter::Debug
        } else {
            config.log_level.to_level_filter()
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    }

    fn load_config(path: Option<&Path>) -> CliResult<IngestConfig> {
        match path {
            Some(path) => IngestConfig::load(path).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", path.display(), e).into()
            }),
            None => Ok(IngestConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    fn run_ingest(
        config: IngestConfig,
        manifest: &Path,
        images: &Path,
        output: &Path,
    ) -> CliResult<()> {
        let outcome = Ingestor::new(config).run(manifest, images, output)?;
        let report = &outcome.report;

        println!("Processed {} images", report.images_processed);
        println!(
            "Created {} challenges ({} regions)",
            report.challenges_created, report.regions_created
        );
        for (file, reason) in &report.skipped_files {
            println!("Skipped {file}: {reason}");
        }
        if !report.warnings.is_empty() {
            println!("{} warnings (see log)", report.warnings.len());
        }
        println!("Corpus written to {}", report.corpus_path.display());
        Ok(())
    }

    fn run_check(corpus: &Path, id: &str, point: Point, hostname: String) -> CliResult<()> {
        let store = CorpusStore::load(corpus)?;
        let challenge = store.get(id).ok_or_else(|| -> CliError {
            format!("No challenge '{id}' in {}", corpus.display()).into()
        })?;

        let mut session = Session::new(SessionConfig::new(hostname), rand::thread_rng());
        session.load(vec![challenge.clone()]);
        session.select(point);
        let response = session
            .verify()
            .ok_or_else(|| -> CliError { "Verification did not run".into() })?;

        println!("{}", serde_json::to_string_pretty(&response)?);
        if let Some(message) = session.success_message().or(session.failure_message()) {
            eprintln!("{message}");
        }
        Ok(())
    }

    fn run_init_config() -> CliResult<()> {
        let path = IngestConfig::default().save_to_default_path()?;
        println!("Wrote {}", path.display());
        Ok(())
    }
}
