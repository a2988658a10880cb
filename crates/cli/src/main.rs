//! Finetune evaluation CLI
//!
//! Runs crash-resilient evaluation competitions and inspects their
//! checkpoints.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::warn;

use finetune_eval_application::run_exit_hooks;
use finetune_eval_cli::commands::{datasets, inspect, purge, run, CommandContext};
use finetune_eval_cli::output::OutputFormat;
use finetune_eval_cli::{config, exit_code, Overrides, EXIT_INTERRUPTED};
use finetune_eval_common::init_tracing;

/// Output format for CLI commands
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum CliOutputFormat {
    /// JSON output
    Json,
    /// Table output (default)
    #[default]
    Table,
    /// Plain text output
    Plain,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "finetune-eval")]
#[command(author, version, about = "Incremental fine-tune evaluation pipeline")]
#[command(long_about = "Evaluates submitted fine-tuned models against a fixed, checkpointed task set.\n\n\
    Progress is saved after every candidate, so an interrupted run resumes where it stopped.")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "FINETUNE_EVAL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding checkpoint files (overrides config)
    #[arg(long, global = true)]
    checkpoint_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, global = true, value_enum, default_value = "table")]
    format: CliOutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate all newly discovered candidates of a competition
    #[command(alias = "r")]
    Run {
        /// Competition to evaluate (defaults to pipeline.competition_id)
        #[arg(short, long)]
        competition_id: Option<String>,

        /// Dataset source for a new task set
        #[arg(short, long)]
        dataset: Option<String>,

        /// Number of tasks in a new task set
        #[arg(short = 'n', long)]
        sample_size: Option<usize>,

        /// Keep checkpoints after a successful run
        #[arg(long)]
        keep_checkpoints: bool,
    },

    /// Build or load a competition's task set without scoring
    Tasks {
        /// Competition id
        #[arg(short, long)]
        competition_id: Option<String>,

        /// Dataset source for a new task set
        #[arg(short, long)]
        dataset: Option<String>,

        /// Number of tasks in a new task set
        #[arg(short = 'n', long)]
        sample_size: Option<usize>,
    },

    /// Show checkpointed results
    Results {
        /// Competition id
        #[arg(short, long)]
        competition_id: Option<String>,
    },

    /// Show the best checkpointed candidate
    Top {
        /// Competition id
        #[arg(short, long)]
        competition_id: Option<String>,
    },

    /// Remove checkpoints
    Purge {
        /// Competition whose checkpoints are removed
        #[arg(short, long, conflicts_with = "all")]
        competition_id: Option<String>,

        /// Remove every checkpoint in the directory
        #[arg(long)]
        all: bool,

        /// Do not ask for confirmation
        #[arg(short, long, requires = "all")]
        yes: bool,
    },

    /// List dataset sources
    Datasets,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    fn overrides(&self) -> (Option<String>, Option<usize>) {
        match self {
            Commands::Run {
                dataset,
                sample_size,
                ..
            }
            | Commands::Tasks {
                dataset,
                sample_size,
                ..
            } => (dataset.clone(), *sample_size),
            _ => (None, None),
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "finetune-eval", &mut std::io::stdout());
}

async fn dispatch(ctx: CommandContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            competition_id,
            keep_checkpoints,
            ..
        } => run::run(&ctx, competition_id, keep_checkpoints).await,
        Commands::Tasks { competition_id, .. } => inspect::tasks(&ctx, competition_id).await,
        Commands::Results { competition_id } => inspect::results(&ctx, competition_id),
        Commands::Top { competition_id } => inspect::top(&ctx, competition_id),
        Commands::Purge {
            competition_id,
            all,
            yes,
        } => {
            let scope = if all {
                purge::PurgeScope::All { assume_yes: yes }
            } else {
                purge::PurgeScope::Competition(competition_id)
            };
            purge::purge(&ctx, scope)
        }
        Commands::Datasets => datasets::list(&ctx),
        Commands::Completions { .. } => {
            // Already handled in main
            Ok(())
        }
    }
}

fn report_error(err: &anyhow::Error, verbose: bool) -> i32 {
    eprintln!("{} {}", "Error:".red().bold(), err);
    if verbose {
        eprintln!("\n{}", "Details:".dimmed());
        eprintln!("{:?}", err);
    }
    exit_code(err)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Completions need neither config nor logging
    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return;
    }

    let verbose = cli.verbose;
    let (dataset, sample_size) = cli.command.overrides();
    let overrides = Overrides {
        checkpoint_dir: cli.checkpoint_dir.clone(),
        dataset,
        sample_size,
        verbose,
    };

    let code = match config::load(cli.config.as_deref(), &overrides) {
        Err(err) => report_error(&err, verbose),
        Ok(app_config) => {
            if let Err(err) = init_tracing(
                app_config.telemetry.json_logging,
                &app_config.telemetry.log_level,
            ) {
                eprintln!("{} {}", "Warning:".yellow().bold(), err);
            }

            let ctx = CommandContext::new(app_config, cli.format.into());
            tokio::select! {
                result = dispatch(ctx, cli.command) => match result {
                    Ok(()) => 0,
                    Err(err) => report_error(&err, verbose),
                },
                Ok(()) = tokio::signal::ctrl_c() => {
                    warn!("Interrupted, cleaning up");
                    eprintln!("{}", "Interrupted".yellow().bold());
                    EXIT_INTERRUPTED
                }
            }
        }
    };

    let fired = run_exit_hooks();
    if fired > 0 {
        tracing::debug!(fired, "Exit hooks purged checkpoints");
    }
    std::process::exit(code);
}
