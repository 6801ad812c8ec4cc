use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use progchart_cli::commands::{self, RunOptions};
use progchart_cli::{CliContext, CliError, logging};
use progchart_types::ChartMode;

#[derive(Parser)]
#[command(version, about = "Raid progression charts from FFLogs reports")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch attempts, evaluate progression and render the chart
    Run {
        /// Milestone definition file (TOML)
        #[arg(short, long)]
        milestones: Option<PathBuf>,
        /// Chart output path (PNG)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Vertical axis: depth or duration
        #[arg(long)]
        mode: Option<ChartMode>,
        /// Ignore cached reports
        #[arg(long)]
        refresh: bool,
        /// Write an animated GIF with one frame per pull
        #[arg(long)]
        animate: bool,
    },
    /// Evaluate an exported attempt list (JSON) offline
    Evaluate {
        #[arg(short, long)]
        attempts: PathBuf,
        #[arg(short, long)]
        milestones: Option<PathBuf>,
    },
    /// Load and validate a milestone definition file
    Validate {
        #[arg(short, long)]
        milestones: Option<PathBuf>,
    },
    /// List game abilities, optionally filtered by name
    Abilities {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the configuration file location and values
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(respond(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("{}", err.report());
            ExitCode::FAILURE
        }
    }
}

async fn respond(cli: Cli) -> Result<(), CliError> {
    let mut ctx = CliContext::load(cli.config)?;

    match cli.command {
        Commands::Run {
            milestones,
            output,
            mode,
            refresh,
            animate,
        } => {
            let options = RunOptions {
                milestones,
                output,
                mode,
                refresh,
                animate,
            };
            commands::run(&mut ctx, options).await
        }
        Commands::Evaluate { attempts, milestones } => {
            commands::evaluate_file(&ctx, &attempts, milestones.as_deref())
        }
        Commands::Validate { milestones } => commands::validate(&ctx, milestones.as_deref()),
        Commands::Abilities { search } => commands::abilities(&mut ctx, search.as_deref()).await,
        Commands::Config => commands::show_config(&ctx),
    }
}
