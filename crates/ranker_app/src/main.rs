mod cli;
mod config;
mod logging;
mod render;
mod run;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use ranker_logging::ranker_error;

use crate::cli::Cli;
use crate::run::Outcome;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log, LevelFilter::Info);

    match run::run(cli).await {
        Ok(Outcome::Ranked) => ExitCode::SUCCESS,
        Ok(Outcome::Failed) => ExitCode::FAILURE,
        Err(err) => {
            ranker_error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
