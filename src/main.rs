// SPDX-License-Identifier: PMPL-1.0-or-later

//! snippet-audit: syntax, style and known-vulnerability checks for Python
//!
//! Runs either as an HTTP service backing the bundled web page or as a
//! command-line tool over files and directories.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snippet_audit::catalog::{default_catalog_path, Catalog};
use snippet_audit::config::{AppConfig, ConfigOverrides};
use snippet_audit::report::{self, ReportFormatter, ReportOutputFormat};
use snippet_audit::{server, storage, sweep};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "snippet-audit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Syntax, style and known-vulnerability checks for Python code snippets")]
#[command(long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web page and the /analyze endpoint
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Vulnerability catalog (CSV)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// YAML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Re-read the catalog on every request
        #[arg(long)]
        reload_catalog: bool,
    },

    /// Analyze a Python file, or every Python file under a directory
    Analyze {
        /// File or directory to analyze
        #[arg(value_name = "TARGET")]
        target: PathBuf,

        /// Vulnerability catalog (CSV) [default: bundled catalog]
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Output format for --output / --output-dir
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportOutputFormat,

        /// Write the report to this file instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also store a timestamped copy of the report in this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List the rules in a vulnerability catalog
    Catalog {
        /// Vulnerability catalog (CSV) [default: bundled catalog]
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_catalog(path: Option<PathBuf>) -> Result<Catalog> {
    let path = path.unwrap_or_else(default_catalog_path);
    Catalog::load(&path).context("Dataset not loaded. Cannot perform vulnerability analysis.")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            catalog,
            config,
            reload_catalog,
        } => {
            let overrides = ConfigOverrides {
                host,
                port,
                catalog_path: catalog,
                reload_catalog,
            };
            let config = AppConfig::load(config.as_deref(), overrides)?;
            info!("Starting snippet-audit v{}", env!("CARGO_PKG_VERSION"));
            server::run(config).await?;
        }

        Commands::Analyze {
            target,
            catalog,
            format,
            output,
            output_dir,
        } => {
            let catalog = load_catalog(catalog)?;
            info!("Analyzing {} with {} catalog rules", target.display(), catalog.len());

            let report = tokio::task::spawn_blocking(move || sweep::run(&target, &catalog))
                .await
                .context("analysis task panicked")??;

            if let Some(dir) = output_dir {
                for path in storage::persist_report(&report, &dir, &[format])? {
                    info!("Stored report: {}", path.display());
                }
            }

            if let Some(output_path) = output {
                report::save_report(&report, &output_path, format)?;
            } else {
                ReportFormatter::new(cli.verbose).print_sweep(&report);
            }
        }

        Commands::Catalog { catalog } => {
            let catalog = load_catalog(catalog)?;
            ReportFormatter::new(cli.verbose).print_catalog(&catalog);
        }
    }

    Ok(())
}
