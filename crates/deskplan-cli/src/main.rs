//! Deskplan CLI.
//!
//! Solve dataset files with the two-phase pipeline, or rebuild the report of
//! a previously persisted phase.

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deskplan::{
    report_from_store, solve_all, ArtifactStore, Dataset, Instance, InstanceSource, Phase,
    PlannerConfig, SatisfactionTarget,
};

#[derive(Parser)]
#[command(name = "deskplan")]
#[command(about = "Two-phase desk scheduling for hybrid work")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, or YAML with a .yaml/.yml extension)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Suppress the colored event log
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one or more dataset files.
    Solve {
        /// Dataset JSON files, solved in the given order
        #[arg(required = true)]
        instances: Vec<PathBuf>,
        /// Artifact directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Share of the achieved preference presence kept in phase 1
        #[arg(long, conflicts_with = "match_achieved")]
        ratio: Option<f64>,
        /// Keep the share of preferred presence achieved in phase 2
        #[arg(long)]
        match_achieved: bool,
        /// Solve instances concurrently
        #[arg(long)]
        parallel: bool,
        /// Do not write snapshots
        #[arg(long)]
        no_persist: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the report of a persisted phase.
    Report {
        /// Dataset JSON file the snapshot was solved from
        instance: PathBuf,
        /// Phase to report
        #[arg(short, long, value_enum, default_value = "cohesion")]
        phase: PhaseArg,
        /// Artifact directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PhaseArg {
    Preference,
    Cohesion,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Preference => Phase::Preference,
            PhaseArg::Cohesion => Phase::Cohesion,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PlannerConfig> {
    let Some(path) = path else {
        return Ok(PlannerConfig::new());
    };
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    let config = if is_yaml {
        PlannerConfig::from_yaml_file(path)
    } else {
        PlannerConfig::load(path)
    };
    config.with_context(|| format!("loading configuration from {}", path.display()))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if !cli.quiet {
        deskplan::console::init();
    }
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Solve {
            instances,
            output,
            ratio,
            match_achieved,
            parallel,
            no_persist,
            json,
        } => {
            if let Some(directory) = output {
                config = config.with_output_directory(directory);
            }
            if let Some(ratio) = ratio {
                config = config.with_satisfaction_target(SatisfactionTarget::Fixed { ratio });
            }
            if match_achieved {
                config = config.with_satisfaction_target(SatisfactionTarget::MatchAchieved);
            }
            if parallel {
                config = config.with_parallel(true);
            }
            if no_persist {
                config = config.with_persist(false);
            }

            let report = solve_all(config, instances)?;
            if json {
                println!("{}", output::batch_json(&report)?);
            } else {
                output::print_batch(&report);
            }
            Ok(if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Report {
            instance,
            phase,
            output,
            json,
        } => {
            if let Some(directory) = output {
                config = config.with_output_directory(directory);
            }
            let id = InstanceSource::file(&instance).id();
            let dataset = Dataset::from_json_file(&instance)?;
            let instance = Instance::from_dataset(&id, &dataset, config.attendance)?;
            let store = ArtifactStore::new(&config.output.directory);

            let report = report_from_store(&store, &instance, phase.into())?;
            if json {
                println!("{}", report.to_json_string()?);
            } else {
                output::print_report(&report);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
