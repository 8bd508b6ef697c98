//! Access Warden CLI
//!
//! Command-line interface for running periodic access reviews over HR and
//! IT system extracts.

use anyhow::{Context, Result};
use aw_observability::logging::{init_logging_with_config, LoggingConfig};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, warn};

mod commands;
mod config;
mod validator;

use commands::{print_outcome, run_review, RunOptions};
use config::AppConfig;
use validator::ConfigValidator;

/// Exit code of a `--strict` run whose report is missing sections.
const EXIT_PARTIAL_REPORT: i32 = 2;

#[derive(Parser)]
#[command(name = "access-warden")]
#[command(author = "Access Warden Team")]
#[command(version)]
#[command(about = "Access compliance reviews from HR and IT system extracts", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run an access review over a directory of extracts
    Run {
        /// Directory holding the HR and IT system extracts
        #[arg(default_value = "data")]
        input_dir: PathBuf,

        /// Directory to write the report to (overrides report.output_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Date to run the review as of (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "DATE")]
        run_date: Option<NaiveDate>,

        /// Exit with code 2 if any report section failed
        #[arg(long)]
        strict: bool,
    },

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also check that this directory holds the expected extracts
        #[arg(long, value_name = "DIR")]
        input_dir: Option<PathBuf>,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = AppConfig::load_or_default(&config_path, cli.config.is_some())?;

    // Initialize logging
    let logging = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default().with_level_name(&config.logging.level)
    };
    init_logging_with_config(LoggingConfig {
        json_format: config.logging.json_format,
        ..logging
    });

    if config_path.exists() {
        debug!(path = %config_path.display(), "Loaded configuration");
    } else {
        debug!("Using default configuration (no config file found)");
    }

    // Execute command
    match cli.command {
        Commands::Run {
            input_dir,
            output,
            run_date,
            strict,
        } => {
            let options = RunOptions {
                input_dir,
                output_dir: output,
                run_date: run_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            };
            cmd_run(config, options, strict, cli.format).await
        }
        Commands::Validate {
            config: cfg_path,
            input_dir,
        } => cmd_validate(cfg_path.unwrap_or(config_path), input_dir).await,
        Commands::Config => cmd_config(config, cli.format).await,
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "access-warden", "access-warden") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/default.yaml")
    }
}

async fn cmd_run(config: AppConfig, options: RunOptions, strict: bool, format: OutputFormat) -> Result<()> {
    let validation_result = ConfigValidator::validate(&config);
    if validation_result.has_errors() {
        validation_result.print();
        println!();
        println!(
            "{}",
            "Review aborted due to configuration errors. Fix the errors above and try again."
                .red()
                .bold()
        );
        std::process::exit(1);
    }
    for warning in &validation_result.warnings {
        warn!("{}", warning);
    }

    let outcome = run_review(&config, &options).await?;
    print_outcome(&outcome, &options, format)?;

    if strict && !outcome.report.is_complete() {
        std::process::exit(EXIT_PARTIAL_REPORT);
    }

    Ok(())
}

async fn cmd_validate(config_path: PathBuf, input_dir: Option<PathBuf>) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let config = if config_path.exists() {
        match AppConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("{}: {:#}", "Configuration file error".red().bold(), e);
                std::process::exit(1);
            }
        }
    } else {
        println!(
            "  {} No configuration file found, validating defaults",
            "→".green()
        );
        AppConfig::default()
    };

    // Run comprehensive validation
    let mut validation_result = ConfigValidator::validate(&config);
    if let Some(dir) = &input_dir {
        validation_result.merge(ConfigValidator::validate_input_dir(&config, dir));
    }
    validation_result.print();

    // Summary
    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!(
        "  Grace periods: joiner {}d, leaver {}d",
        config.inspection.joiner_grace_days, config.inspection.leaver_grace_days
    );
    println!(
        "  Review period: {}",
        serde_json::to_value(config.inspection.review_period)?
            .as_str()
            .unwrap_or("all")
    );
    println!(
        "  Expected systems: {}",
        config
            .inspection
            .joiner_expected_systems
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Output directory: {}", config.report.output_dir.display());

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}

async fn cmd_config(config: AppConfig, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Current Configuration".bold());
        println!("─────────────────────────");
        let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        print!("{}", yaml);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "access-warden",
            "--format",
            "json",
            "run",
            "extracts",
            "--output",
            "out",
            "--run-date",
            "2024-06-01",
            "--strict",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Run {
                input_dir,
                output,
                run_date,
                strict,
            } => {
                assert_eq!(input_dir, PathBuf::from("extracts"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(run_date, NaiveDate::from_ymd_opt(2024, 6, 1));
                assert!(strict);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["access-warden", "run"]).unwrap();
        match cli.command {
            Commands::Run {
                input_dir,
                output,
                run_date,
                strict,
            } => {
                assert_eq!(input_dir, PathBuf::from("data"));
                assert!(output.is_none());
                assert!(run_date.is_none());
                assert!(!strict);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_invalid_run_date_rejected() {
        assert!(Cli::try_parse_from(["access-warden", "run", "--run-date", "01/06/2024"]).is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
