use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "planscope",
    version,
    about = "Business-plan competition analytics: cleaning, track heat, diagnosis and score prediction"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Project root holding planscope.toml and the data directories
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean the raw award table and write the processed dataset
    Clean(CleanCommand),
    /// Rank competition tracks into heat tiers
    Tracks(TracksCommand),
    /// Compare a project description against top-tier winners
    Diagnose(DiagnoseCommand),
    /// Fit the score model on the processed dataset
    Train(TrainCommand),
    /// Predict a composite score from three sub-scores
    Predict(PredictCommand),
}

#[derive(Args)]
pub struct CleanCommand {
    /// Raw CSV (defaults to paths.raw_data)
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Processed CSV (defaults to paths.processed_data)
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct TracksCommand {
    /// Number of heat clusters (defaults to tracks.cluster_count)
    #[arg(long)]
    pub clusters: Option<usize>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct DiagnoseCommand {
    /// Project description
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub text: Option<String>,
    /// File holding the project description
    #[arg(long, required_unless_present = "text", conflicts_with = "text")]
    pub file: Option<PathBuf>,
    /// Number of keywords to report (defaults to diagnosis.top_keywords)
    #[arg(long)]
    pub top: Option<usize>,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct TrainCommand {
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Args)]
pub struct PredictCommand {
    #[arg(long, value_parser = parse_score)]
    pub market: f64,
    #[arg(long, value_parser = parse_score)]
    pub tech: f64,
    #[arg(long, value_parser = parse_score)]
    pub team: f64,
    #[arg(short, long, value_enum, default_value = "md")]
    pub format: ReportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

fn parse_score(value: &str) -> Result<f64, String> {
    let score = value
        .parse::<f64>()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=100.0).contains(&score) {
        Ok(score)
    } else {
        Err(format!("score {score} is outside 0-100"))
    }
}
