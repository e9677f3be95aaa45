//! `nbdeploy` command line: split a notebook into Python modules.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use nbdeploy_core::extract::extract_code_elements;
use nbdeploy_core::grouping::{build_proposer, parse_grouping, CodeStringMode, ProposerKind};
use nbdeploy_core::models::ImportsFileStatus;
use nbdeploy_core::notebook::load_notebook;
use nbdeploy_core::verify::verify_grouping;
use nbdeploy_core::{DeployConfig, Pipeline};

#[derive(Parser)]
#[command(name = "nbdeploy", version, about = "Turn a Jupyter notebook into organized Python modules")]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, group, verify and write the notebook's code.
    Deploy {
        notebook: PathBuf,

        /// Directory the modules are written to.
        #[arg(short, long)]
        destination: Option<PathBuf>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        seed: Option<i64>,

        /// Send the whole cell source instead of the reconstructed catalog.
        #[arg(long)]
        full_code_string: bool,

        /// Use a saved grouping reply instead of calling the API.
        #[arg(long, value_name = "JSON")]
        replay: Option<PathBuf>,

        /// Save the proposed grouping as JSON.
        #[arg(long, value_name = "PATH")]
        save_grouping: Option<PathBuf>,
    },
    /// Print the extracted element catalog as JSON.
    Extract { notebook: PathBuf },
    /// Check a saved grouping against the notebook's elements.
    Verify { notebook: PathBuf, grouping: PathBuf },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Deploy {
            notebook,
            destination,
            model,
            seed,
            full_code_string,
            replay,
            save_grouping,
        } => {
            let mut config = DeployConfig::from_env()?;
            if let Some(destination) = destination {
                config.destination = destination;
            }
            if let Some(model) = model {
                config.model = model;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if full_code_string {
                config.code_mode = CodeStringMode::FullSource;
            }
            if let Some(path) = replay {
                config.proposer = ProposerKind::Replay(path);
            }
            config.save_grouping = save_grouping.or(config.save_grouping);
            debug!(?config, "Resolved configuration");
            deploy(config, &notebook)
        }
        Command::Extract { notebook } => {
            let unit = load_notebook(&notebook)?;
            let catalog = extract_code_elements(unit.as_str())?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { notebook, grouping } => {
            let unit = load_notebook(&notebook)?;
            let catalog = extract_code_elements(unit.as_str())?;
            let reply = std::fs::read_to_string(&grouping)
                .with_context(|| format!("failed to read {}", grouping.display()))?;
            let grouping = parse_grouping(&reply)?;
            verify_grouping(&catalog, &grouping)?;
            println!(
                "Grouping covers all {} elements in {} files.",
                catalog.element_count(),
                grouping.len()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn deploy(config: DeployConfig, notebook: &Path) -> Result<ExitCode> {
    let proposer = build_proposer(&config)?;
    let pipeline = Pipeline::new(config, proposer);
    let report = pipeline
        .deploy_notebook(notebook)
        .with_context(|| format!("deploying {}", notebook.display()))?;

    match &report.materialized.imports {
        ImportsFileStatus::Written(path) => {
            println!("File written successfully to {}", path.display())
        }
        ImportsFileStatus::Skipped(path) => {
            println!("Imports file already exists at {}, left unchanged", path.display())
        }
        ImportsFileStatus::Failed(err) => println!("{err}"),
    }
    for file in &report.materialized.files {
        println!("{file}");
    }

    info!(
        sha256 = %report.content_hash,
        functions = report.functions,
        classes = report.classes,
        files = report.grouping.len(),
        elapsed_ms = report.elapsed_ms,
        "Deploy finished"
    );

    if report.materialized.all_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
