use clap::error::ErrorKind;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fmt::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::engine::LoadSimulator;
use crate::error::{Error, Result};
use crate::models::{BalancingStrategy, Scenario, TrafficPattern};
use crate::output::{Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};
use crate::presets::{self, PRESETS};

#[derive(Parser, Debug)]
#[command(name = "load-sim", version, about = "Simulate a server fleet behind a load balancer")]
pub struct Args {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one or all scenarios from a config file or a built-in preset
    Run(RunArgs),
    /// Check a config file without running it
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// List scenario names in a config file
    List {
        #[arg(long)]
        config: PathBuf,
    },
    ListStrategies,
    ListPatterns,
    ListPresets,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[arg(long, required_unless_present = "preset")]
    pub config: Option<PathBuf>,
    /// Run a built-in scenario group instead of a config file
    #[arg(long, conflicts_with = "config")]
    pub preset: Option<String>,
    /// Run only this scenario
    #[arg(long)]
    pub scenario: Option<String>,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
    /// Print metrics snapshots to stderr while running
    #[arg(long)]
    pub progress: bool,
    /// Include per-server state in the results
    #[arg(long)]
    pub detailed: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

pub fn parse_args() -> Result<Args> {
    Args::try_parse().map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => Error::Cli(err.to_string()),
    })
}

/// Installs a stderr subscriber. `-v` flags win over `RUST_LOG`.
pub fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn execute(args: Args) -> Result<String> {
    match args.command {
        Command::Run(run) => run_command(run),
        Command::Validate { config } => {
            let scenarios = config::load_validated(&config)?;
            Ok(format!(
                "{}: {} scenario(s) valid\n",
                config.display(),
                scenarios.len()
            ))
        }
        Command::List { config } => {
            let scenarios = config::load_validated(&config)?;
            let mut out = String::new();
            for scenario in &scenarios {
                match &scenario.description {
                    Some(description) => writeln!(out, "{}: {}", scenario.name, description),
                    None => writeln!(out, "{}", scenario.name),
                }
                .map_err(|err| Error::Output(err.to_string()))?;
            }
            Ok(out)
        }
        Command::ListStrategies => Ok(BalancingStrategy::ALL
            .iter()
            .map(|strategy| format!("{}: {}\n", strategy, strategy.description()))
            .collect()),
        Command::ListPatterns => Ok(TrafficPattern::ALL
            .iter()
            .map(|pattern| format!("{}: {}\n", pattern, pattern.description()))
            .collect()),
        Command::ListPresets => Ok(PRESETS
            .iter()
            .map(|preset| format!("{}: {}\n", preset.name, preset.description))
            .collect()),
    }
}

fn run_command(args: RunArgs) -> Result<String> {
    let scenarios = match (&args.preset, &args.config) {
        (Some(name), _) => presets::find_preset(name)?.scenarios(),
        (None, Some(path)) => config::load_validated(path)?,
        (None, None) => {
            return Err(Error::Cli(
                "either --config or --preset is required".to_string(),
            ))
        }
    };
    let selected: Vec<&Scenario> = match &args.scenario {
        Some(name) => vec![config::find_scenario(&scenarios, name)?],
        None => scenarios.iter().collect(),
    };

    let mut results = Vec::with_capacity(selected.len());
    for scenario in selected {
        let mut simulator = LoadSimulator::new(scenario.clone())?;
        if args.progress {
            let name = scenario.name.clone();
            let duration = scenario.duration;
            simulator.register_metrics_callback(
                move |metrics, time| {
                    eprintln!(
                        "[{}] {:>5.1}% t={:.1} requests={} success={:.1}%",
                        name,
                        (time / duration * 100.0).min(100.0),
                        time,
                        metrics.total_requests,
                        metrics.success_rate() * 100.0
                    );
                    Ok(())
                },
                scenario.metrics_interval,
            );
        }
        simulator.run()?;
        results.push(if args.detailed {
            simulator.detailed_results()
        } else {
            simulator.results()
        });
    }

    formatter_for(args.format).write(&results)
}

fn formatter_for(format: FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
