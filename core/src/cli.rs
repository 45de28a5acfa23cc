use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, OutputFormat};
use crate::factory::StepFactoryStore;
use crate::freezable::FreezableStep;
use crate::freeze::freeze;
use crate::parser::{self, semantic_validator};
use crate::serialization::{self, yaml};
use crate::state::StateMonad;

#[derive(Parser)]
#[command(name = "scl")]
#[command(about = "SCL - parse, check, format and run step workflows", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Freeze and execute a workflow
    Run {
        /// SCL or YAML (.yml/.yaml) file
        file: PathBuf,

        /// Print the final variable state as JSON
        #[arg(long)]
        state: bool,
    },

    /// Report every parse, type and lint problem in a workflow
    Check {
        file: PathBuf,
    },

    /// Re-serialize a workflow
    Format {
        file: PathBuf,

        /// Write YAML instead of SCL
        #[arg(long)]
        yaml: bool,
    },

    /// List the available steps and their properties
    Steps,
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

pub async fn run_cli_with_args(cli: Cli) -> Result<()> {
    let config = Config::builder()
        .config_path(cli.config)
        .log_level(cli.log_level)
        .build()
        .context("Failed to load configuration")?;
    init_tracing(&config.log_level);

    let store = StepFactoryStore::shared();

    match cli.command {
        Commands::Run { file, state } => {
            let step = read_workflow(&file, store)?;
            let frozen = freeze(&step, store)
                .map_err(|errors| anyhow::anyhow!("{}", errors))
                .with_context(|| format!("Failed to freeze {}", file.display()))?;

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, cancelling");
                    on_interrupt.cancel();
                }
            });

            let mut monad = StateMonad::with_settings(config.run_settings());
            let value = frozen
                .run(&mut monad, &cancel)
                .await
                .with_context(|| format!("Failed to run {}", file.display()))?;
            tracing::info!(result = %value, "workflow finished");

            if state {
                println!("{}", serde_json::to_string_pretty(&monad.to_json())?);
            }
        }

        Commands::Check { file } => {
            let step = read_workflow(&file, store)?;
            let mut failed = false;

            if let Err(errors) = freeze(&step, store) {
                for error in errors.iter() {
                    println!("error: {}", error);
                }
                failed = true;
            }

            for finding in semantic_validator::validate_step(&step, store) {
                failed |= finding.is_error();
                println!("{}", finding);
            }

            if failed {
                bail!("{} has errors", file.display());
            }
            println!("{}: ok", file.display());
        }

        Commands::Format { file, yaml: as_yaml } => {
            let step = read_workflow(&file, store)?;
            let frozen = freeze(&step, store).map_err(|errors| anyhow::anyhow!("{}", errors))?;
            let step = frozen.unfreeze();

            let text = if as_yaml || config.output_format == OutputFormat::Yaml {
                yaml::serialize_yaml(&step, store)?
            } else {
                serialization::to_text(&step, store)?
            };
            println!("{}", text.trim_end());
        }

        Commands::Steps => {
            print!("{}", store.describe());
        }
    }

    Ok(())
}

/// Files ending in `.yml` or `.yaml` are YAML, anything else is SCL.
pub fn read_workflow(path: &Path, store: &StepFactoryStore) -> Result<FreezableStep> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"));

    let step = if is_yaml {
        yaml::deserialize_yaml(&text, store)
    } else {
        parser::parse_program(&text)
    };
    step.with_context(|| format!("Failed to parse {}", path.display()))
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Already installed when called twice in one process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
