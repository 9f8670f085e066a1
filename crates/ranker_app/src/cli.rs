use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(
    name = "ranker",
    about = "Parse a requirement document, score a candidate batch against it and print the ranking",
    version
)]
pub struct Cli {
    /// Requirement document (PDF) for Stage A
    #[arg(long)]
    pub requirements: PathBuf,
    /// Candidate archive (ZIP) scored in Stage B
    #[arg(long)]
    pub batch: PathBuf,
    /// Results page to print once scoring completes
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// RON configuration file
    #[arg(long, default_value = "ranker.ron")]
    pub config: PathBuf,
    /// Override the job service base URL
    #[arg(long)]
    pub api_url: Option<String>,
    /// Override the poll interval in seconds
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,
}
