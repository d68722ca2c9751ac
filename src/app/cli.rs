//! Command line arguments for the demo driver

use crate::core::config::ConfigOverrides;
use crate::dispatch::DrainMode;
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "eventstack")]
#[command(about = "Seed events from a line of letters and dispatch them across a worker pool")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Events to seed, one per character ('a' is type 0); read from stdin when omitted
    #[arg(short = 'e', long = "events", value_name = "LETTERS")]
    pub events: Option<String>,

    /// Configuration file path
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Size of the valid event type range
    #[arg(long = "event-types", value_name = "N")]
    pub event_types: Option<usize>,

    /// Publish attempts accepted per run
    #[arg(long = "publish-ceiling", value_name = "N")]
    pub publish_ceiling: Option<usize>,

    /// When workers stop looking for work
    #[arg(long = "drain", value_name = "MODE", value_parser = ["snapshot", "quiescent"])]
    pub drain: Option<String>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease log verbosity (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,

    /// Force colored output
    #[arg(long = "color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level, overrides -v/-q
    #[arg(long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,
}

impl Args {
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(i8::MAX as u8) as i8) - (self.quiet.min(i8::MAX as u8) as i8)
    }

    pub fn use_color(&self) -> bool {
        (self.color || std::io::stderr().is_terminal()) && !self.no_color
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            worker_count: self.workers,
            event_types: self.event_types,
            publish_ceiling: self.publish_ceiling,
            // value_parser restricts the accepted strings
            drain_mode: self.drain.as_deref().and_then(|d| d.parse::<DrainMode>().ok()),
        }
    }
}
