mod cli;
mod config;
mod platform;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use watermark_logging::{wm_error, DEFAULT_LOG_FILE};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    watermark_logging::initialize(cli.log.into(), level, Path::new(DEFAULT_LOG_FILE));

    match platform::run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            wm_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
