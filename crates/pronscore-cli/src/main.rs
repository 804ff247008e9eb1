//! Pronscore CLI - Pronoun antecedent scoring
//!
//! Usage:
//!   pronscore score <base> [--setting fem] [--all-settings]
//!   pronscore batch <model> [--data-file hij_test_head.jsonlines]...

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pronscore_core::{AppConfig, LoggingConfig, Setting, StackMode};
use pronscore_eval::driver::{EvalPaths, PronounEvaluator};
use pronscore_eval::results;

#[derive(Parser)]
#[command(name = "pronscore")]
#[command(about = "Score predicted coreference on third-person pronouns")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cluster reconstruction mode for nested mentions sharing an id
    #[arg(long, global = true)]
    stack_mode: Option<StackMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score `<base>.pred.conll` against `<base>.gold.conll`
    Score {
        /// Base path of the gold and prediction files
        base: PathBuf,

        /// Pronoun setting (all, fem, masc, gi); repeatable
        #[arg(long = "setting")]
        settings: Vec<Setting>,

        /// Evaluate every setting
        #[arg(long, conflicts_with = "settings")]
        all_settings: bool,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a model's output for each data file and store the scores
    Batch {
        /// Model name, used as file prefix and results file name
        model: String,

        /// Data file to score; repeatable, defaults to the configured list
        #[arg(long = "data-file")]
        data_files: Vec<String>,

        /// Directory holding the CoNLL output
        #[arg(long)]
        conll_dir: Option<PathBuf>,

        /// Directory holding the `<model>.json` results file
        #[arg(long)]
        logs_dir: Option<PathBuf>,

        /// Pronoun setting (all, fem, masc, gi); repeatable
        #[arg(long = "setting")]
        settings: Vec<Setting>,

        /// Evaluate every setting
        #[arg(long, conflicts_with = "settings")]
        all_settings: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    if let Some(mode) = cli.stack_mode {
        config.eval.stack_mode = mode;
    }

    init_tracing(&config.logging);
    tracing::debug!("Configuration: {:?}", config);

    let evaluator = PronounEvaluator::from_config(&config.eval);

    match cli.command {
        Commands::Score {
            base,
            settings,
            all_settings,
            json,
        } => {
            let settings = resolve_settings(settings, all_settings, config.eval.setting);
            let paths = EvalPaths::from_base(&base);
            let summary = evaluator
                .evaluate_paths(&paths, &settings)
                .with_context(|| format!("Failed to score {}", paths.name))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", summary.report());
            }
        }
        Commands::Batch {
            model,
            data_files,
            conll_dir,
            logs_dir,
            settings,
            all_settings,
        } => {
            let settings = resolve_settings(settings, all_settings, config.eval.setting);
            let data_files = if data_files.is_empty() {
                config.eval.data_files.clone()
            } else {
                data_files
            };
            let conll_dir = conll_dir.unwrap_or_else(|| config.eval.conll_dir.clone());
            let logs_dir = logs_dir.unwrap_or_else(|| config.eval.logs_dir.clone());

            let mut entries = Vec::new();
            for data_file in &data_files {
                let paths = EvalPaths::for_data_file(&conll_dir, &model, data_file);
                let summary = match evaluator.evaluate_paths(&paths, &settings) {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::error!("Skipping {}: {}", data_file, e);
                        continue;
                    }
                };

                print!("{}", summary.report());
                for report in &summary.reports {
                    entries.push((results::score_key(data_file, report.setting), report.score));
                }
            }

            if entries.is_empty() {
                tracing::warn!("No scores computed for model {}", model);
                return Ok(());
            }

            let path = results::results_path(&logs_dir, &model);
            results::merge_scores(&path, &entries)
                .with_context(|| format!("Failed to update {}", path.display()))?;
            tracing::info!("Wrote {} scores to {}", entries.len(), path.display());
        }
    }

    Ok(())
}

fn resolve_settings(settings: Vec<Setting>, all_settings: bool, default: Setting) -> Vec<Setting> {
    if all_settings {
        Setting::ALL.to_vec()
    } else if settings.is_empty() {
        vec![default]
    } else {
        settings
    }
}

/// Logs go to stderr; reports go to stdout
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}
