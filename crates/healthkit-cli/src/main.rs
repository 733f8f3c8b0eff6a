use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use healthkit_cli::cli::commands::{self, Metric};
use healthkit_cli::cli::OutputFormat;
use healthkit_cli::config::{parse_date_arg, AnalysisConfig};
use healthkit_cli::logging::init_logging;

#[derive(Parser)]
#[command(name = "healthkit")]
#[command(author, version, about = "Clean and summarize an Apple Health export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "HEALTHKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize an export and write Parquet (or CSV) tables
    Clean {
        /// Path to export.xml
        export: PathBuf,
        /// Output directory (defaults to the user data directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Write one CSV file per table instead of Parquet partitions
        #[arg(long)]
        csv: bool,
    },
    /// Workout statistics per activity type
    Workouts {
        /// Path to export.xml
        export: PathBuf,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Daily values of one metric with rolling means
    Trend {
        /// Path to export.xml
        export: PathBuf,
        /// Metric to report
        #[arg(short, long)]
        metric: Metric,
        /// Rolling mean windows in days
        #[arg(short, long, value_delimiter = ',', default_value = "3,7")]
        windows: Vec<usize>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Daily energy balance against basal rate and TDEE
    Energy {
        /// Path to export.xml
        export: PathBuf,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Long-run daily step history with 7- and 100-day means
    Steps {
        /// Path to export.xml
        export: PathBuf,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the default config file path
    Path,
}

/// Load the config file and apply `--from`/`--to`
fn load_config(
    path: Option<&PathBuf>,
    from: Option<String>,
    to: Option<String>,
) -> healthkit_cli::Result<AnalysisConfig> {
    let from: Option<NaiveDate> = from.as_deref().map(parse_date_arg).transpose()?;
    let to: Option<NaiveDate> = to.as_deref().map(parse_date_arg).transpose()?;
    AnalysisConfig::load_or_default(path.map(PathBuf::as_path))?.with_window(from, to)
}

fn run(cli: Cli) -> healthkit_cli::Result<()> {
    let config_path = cli.config.as_ref();
    let format = cli.format;

    match cli.command {
        Commands::Clean {
            export,
            out,
            from,
            to,
            csv,
        } => {
            let config = load_config(config_path, from, to)?;
            commands::clean(&export, out, csv, &config, format)
        }
        Commands::Workouts { export, from, to } => {
            let config = load_config(config_path, from, to)?;
            commands::workouts(&export, &config, format)
        }
        Commands::Trend {
            export,
            metric,
            windows,
            from,
            to,
        } => {
            let config = load_config(config_path, from, to)?;
            commands::trend(&export, metric, &windows, &config, format)
        }
        Commands::Energy { export, from, to } => {
            let config = load_config(config_path, from, to)?;
            commands::energy(&export, &config, format)
        }
        Commands::Steps { export } => {
            let config = load_config(config_path, None, None)?;
            commands::steps(&export, &config, format)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(config_path, None, None)?;
                commands::config_show(&config, format)
            }
            ConfigCommands::Init { force } => {
                commands::config_init(config_path.map(PathBuf::as_path), force)
            }
            ConfigCommands::Path => commands::config_path(),
        },
    }
}

fn main() -> healthkit_cli::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", healthkit_cli::error::format_user_error(&e));
        std::process::exit(1);
    }

    Ok(())
}
