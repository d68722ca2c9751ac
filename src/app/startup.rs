//! Demo binary startup: arguments, logging, configuration, run

use super::cli::Args;
use super::demo::{run_demo, Sink};
use crate::core::config::EngineConfig;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, level_for_verbosity};
use clap::Parser;
use std::io::BufRead;
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_CONFIG: u8 = 1;
const EXIT_FATAL: u8 = 2;

pub fn startup() -> ExitCode {
    let args = Args::parse();

    let log_level = args
        .log_level
        .clone()
        .unwrap_or_else(|| level_for_verbosity(args.verbosity()).to_string());
    if let Err(e) = init_logging(
        Some(&log_level),
        args.log_format.as_deref(),
        args.log_file.as_deref(),
        args.use_color(),
    ) {
        eprintln!("Error initialising logging: {e}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let config = match EngineConfig::load(args.config_file.as_deref(), &args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Configuration loading");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    log::debug!("Effective configuration: {:?}", config);

    let line = match args.events {
        Some(events) => events,
        None => match read_seed_line() {
            Ok(line) => line,
            Err(e) => {
                log::error!("FATAL: Could not read events from stdin: {}", e);
                return ExitCode::from(EXIT_CONFIG);
            }
        },
    };

    let sink: Sink = Arc::new(|line: String| println!("{line}"));
    match run_demo(&config, &line, sink) {
        Ok(report) => {
            println!(
                "Processed {} events ({} dispatched, {} invalid) with {} subscriber calls; {} publishes dropped",
                report.processed(),
                report.dispatched(),
                report.invalid(),
                report.invocations(),
                report.dropped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error_with_context(&e, "Dispatch run");
            if e.is_fatal() {
                ExitCode::from(EXIT_FATAL)
            } else {
                ExitCode::from(EXIT_CONFIG)
            }
        }
    }
}

fn read_seed_line() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}
