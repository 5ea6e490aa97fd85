use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

use paceplan::config::AppConfig;
use paceplan::error::{ErrorSeverity, PlanError};
use paceplan::export::{self, OutputFormat};
use paceplan::logging::init_logging;
use paceplan::planner::{build_plans, parse_time_string, PlanRequest, PlannerOptions};
use paceplan::report::{PaceCalculation, VdotReport};
use paceplan::PerformanceInput;

/// paceplan - Running pace and workout calculator
///
/// Estimates VDOT from a race, converts it to training paces, and turns one
/// structured workout into per-group plans with distance, time and TSS totals.
#[derive(Parser)]
#[command(name = "paceplan")]
#[command(version)]
#[command(about = "Running pace and workout calculator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format (text, json, csv); defaults to the configured format
    #[arg(short = 'f', long, global = true)]
    format: Option<OutputFormat>,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// VDOT, equivalent race times and training paces from one race
    Vdot {
        /// Race distance in meters
        #[arg(short, long)]
        distance: f64,

        /// Race time as MM:SS, HH:MM:SS or decimal minutes
        #[arg(short, long)]
        time: String,
    },

    /// Pace for a VDOT at the top of an intensity zone
    Pace {
        /// Fitness score
        #[arg(long)]
        vdot: f64,

        /// Zone name (Easy, Marathon, Threshold, Interval, Repetition)
        #[arg(short, long)]
        zone: String,

        /// Target distance in meters
        #[arg(short, long, default_value = "1000")]
        distance: f64,
    },

    /// Build per-group plans for one structured workout
    Plan {
        /// Plan request file (.json or .toml)
        #[arg(long, conflicts_with = "form", required_unless_present = "form")]
        file: Option<PathBuf>,

        /// Form submission file with one key=value field per line
        #[arg(long)]
        form: Option<PathBuf>,

        /// Evaluate groups one after another
        #[arg(long)]
        sequential: bool,
    },

    /// Show intensity zones and common interval presets
    Zones,

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", describe_error(&e).red());
            ExitCode::FAILURE
        }
    }
}

/// Failure line for the terminal; calculator errors use their friendly message
fn describe_error(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<PlanError>()) {
        Some(plan_error) => match plan_error.severity() {
            ErrorSeverity::Warning => {
                warn!(error = %plan_error, "Command rejected its input");
                format!("⚠ {}", plan_error.user_message())
            }
            ErrorSeverity::Error => {
                error!(error = %plan_error, "Command failed");
                format!("✗ {}", plan_error.user_message())
            }
        },
        None => format!("✗ {:#}", err),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    let format = cli.format.unwrap_or(config.settings.output_format);

    let rendered = match cli.command {
        Commands::Vdot { distance, time } => {
            let minutes = parse_race_minutes(&time)?;
            let report = VdotReport::calculate(
                &PerformanceInput::new(distance, minutes),
                &config.calculator.equivalent_distances,
            )?;
            export::render_report(&report, format)?
        }

        Commands::Pace {
            vdot,
            zone,
            distance,
        } => {
            let pace = PaceCalculation::calculate(vdot, &zone, distance)?;
            export::render_pace(&pace, format)?
        }

        Commands::Plan {
            file,
            form,
            sequential,
        } => {
            let request = match (file, form) {
                (Some(path), _) => load_plan_request(&path)?,
                (None, Some(path)) => load_form_request(&path)?,
                (None, None) => bail!("Either --file or --form is required"),
            };

            let options = PlannerOptions {
                parallel: config.settings.parallel_groups && !sequential,
            };
            let response = build_plans(&request, &options)?;

            if !response.skipped.is_empty() {
                eprintln!(
                    "{}",
                    format!("⚠ {} group(s) skipped", response.skipped.len()).yellow()
                );
            }
            export::render_plans(&response, format)?
        }

        Commands::Zones => export::render_zones(format)?,

        Commands::Config { list, set, get } => {
            return manage_config(config, cli.config.as_deref(), list, set, get);
        }
    };

    match cli.output {
        Some(path) => {
            export::write_output(&rendered, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{}", format!("✓ Output written to {}", path.display()).green());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Race times with a colon go through the clock parser, others are minutes
fn parse_race_minutes(value: &str) -> Result<f64> {
    if value.contains(':') {
        Ok(parse_time_string(value)?)
    } else {
        value
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid race time: {}", value))
    }
}

fn load_plan_request(path: &Path) -> Result<PlanRequest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file: {}", path.display()))?;

    let request = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => PlanRequest::from_toml_str(&content)?,
        Some("json") | None => PlanRequest::from_json_str(&content)?,
        Some(other) => bail!("Unsupported plan file extension: {}", other),
    };
    Ok(request)
}

fn load_form_request(path: &Path) -> Result<PlanRequest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file: {}", path.display()))?;

    let mut fields = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("{}:{}: expected key=value", path.display(), number + 1);
        };
        fields.push((key.trim().to_string(), value.trim().to_string()));
    }

    Ok(PlanRequest::from_form(&fields)?)
}

fn manage_config(
    mut config: AppConfig,
    config_path: Option<&Path>,
    list: bool,
    set: Option<String>,
    get: Option<String>,
) -> Result<()> {
    if list {
        println!("{}", "Configuration:".white().bold());
        for (key, value) in config.list() {
            println!("  {} = {}", key.cyan(), value);
        }
    } else if let Some(key_value) = set {
        let Some((key, value)) = key_value.split_once('=') else {
            bail!("Expected key=value, got {}", key_value);
        };
        config.set(key.trim(), value.trim())?;

        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(AppConfig::default_config_path);
        config.save_to_file(&path)?;
        println!("{}", format!("✓ {} updated in {}", key.trim(), path.display()).green());
    } else if let Some(key) = get {
        println!("{}", config.get(&key)?);
    } else {
        println!(
            "{}",
            format!("Config file: {}", AppConfig::default_config_path().display()).dimmed()
        );
    }

    Ok(())
}
