mod analyze;
mod cli;
mod config;
mod data;
mod error;
mod model;
mod report;
mod types;

use crate::analyze::diagnose::ProjectDiagnoser;
use crate::data::cache::DatasetCache;
use crate::error::PlanscopeError;
use crate::types::report::{Report, TrainingReport};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const REJECTED: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

const LOG_ENV: &str = "PLANSCOPE_LOG";

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn output_format(format: cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    }
}

fn read_description(path: &Path) -> Result<String, PlanscopeError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PlanscopeError::SourceNotFound(path.display().to_string()))
        }
        Err(e) => Err(PlanscopeError::ReadFailure {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

fn run() -> Result<i32, PlanscopeError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let settings = config::load_settings(&cli.root)?;
    let mut cache = DatasetCache::new();

    match cli.command {
        cli::Commands::Clean(cmd) => {
            let input = cmd.input.unwrap_or_else(|| settings.raw_data.clone());
            let output = cmd.output.unwrap_or_else(|| settings.processed_data.clone());

            let raw = data::load_raw(&input)?;
            let (records, mut cleaning) = data::clean::clean(&raw, settings.keyword_delimiter);
            data::write_processed(&output, &records, settings.keyword_delimiter)?;
            cleaning.output = Some(output);

            let filled = cleaning.filled_any();
            println!(
                "{}",
                report::render(&Report::Cleaning(cleaning), output_format(cmd.format))?
            );
            Ok(if filled {
                exit_code::WARNINGS
            } else {
                exit_code::SUCCESS
            })
        }
        cli::Commands::Tracks(cmd) => {
            let mut params = settings.tracks.clone();
            if let Some(clusters) = cmd.clusters {
                params.cluster_count = clusters;
            }
            let records = cache.load(&settings.processed_data, settings.keyword_delimiter)?;
            let tracks = analyze::tracks::analyze(&records, &params)?;
            println!(
                "{}",
                report::render(&Report::Tracks { tracks }, output_format(cmd.format))?
            );
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Diagnose(cmd) => {
            let text = match (cmd.text, cmd.file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_description(&path)?,
                (None, None) => {
                    return Err(PlanscopeError::Validation(
                        "provide --text or --file".to_string(),
                    ))
                }
            };
            let mut params = settings.diagnosis.clone();
            if let Some(top) = cmd.top {
                params.top_keywords = top;
            }
            let diagnoser = ProjectDiagnoser::new(params);
            diagnoser.check_text(&text)?;

            let records = cache.load(&settings.processed_data, settings.keyword_delimiter)?;
            let diagnosis = diagnoser.diagnose(&text, &records)?;
            let used_fallback = diagnosis.used_fallback();
            println!(
                "{}",
                report::render(&Report::Diagnosis(diagnosis), output_format(cmd.format))?
            );
            Ok(if used_fallback {
                exit_code::WARNINGS
            } else {
                exit_code::SUCCESS
            })
        }
        cli::Commands::Train(cmd) => {
            let records = cache.load(&settings.processed_data, settings.keyword_delimiter)?;
            let artifact = model::train(&records, &settings.training)?;
            model::artifact::save_model(&settings.model_path, &artifact)?;

            let training = TrainingReport {
                train_size: artifact.train_size,
                test_size: artifact.test_size,
                mse: artifact.mse,
                r2: artifact.r2,
                intercept: artifact.model.intercept,
                weights: artifact.model.weights(),
                model_path: settings.model_path.clone(),
                trained_at: artifact.trained_at,
                dataset_sha256: artifact.dataset_sha256,
            };
            println!(
                "{}",
                report::render(&Report::Training(training), output_format(cmd.format))?
            );
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Predict(cmd) => {
            let artifact = model::artifact::load_model(&settings.model_path)?;
            let prediction =
                model::prediction_report(&artifact.model, cmd.market, cmd.tech, cmd.team);
            println!(
                "{}",
                report::render(&Report::Prediction(prediction), output_format(cmd.format))?
            );
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            let code = if e.is_rejection() {
                exit_code::REJECTED
            } else {
                exit_code::RUNTIME_FAILURE
            };
            std::process::exit(code);
        }
    }
}
