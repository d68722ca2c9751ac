//! Logging setup on top of flexi_logger
//!
//! Three line formats are available: `text` (default), `ext` (adds the source
//! location) and `json` (one compact object per line). Levels are abbreviated to
//! three letters in every format.

use std::sync::{Mutex, OnceLock};

static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Start the global logger
///
/// `log_level` accepts any flexi_logger spec (`info`, `eventstack=trace`, ...).
pub fn init_logging(
    log_level: Option<&str>,
    log_format: Option<&str>,
    log_file: Option<&str>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{FileSpec, Logger};

    let level_str = log_level.unwrap_or("info");
    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (log_format.unwrap_or("text"), color_enabled) {
        ("json", _) => logger.format(json_format),
        ("ext", true) => logger.format(extended_color_format),
        ("ext", false) => logger.format(extended_format),
        (_, true) => logger.format(simple_color_format),
        (_, false) => logger.format(simple_format),
    };

    if let Some(file_path) = log_file.filter(|f| *f != "none") {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    // The handle must stay alive for the logger to keep writing
    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));

    Ok(())
}

/// Map `-v`/`-q` counts onto a level, starting from `info`
pub fn level_for_verbosity(verbosity: i8) -> &'static str {
    match verbosity {
        i8::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn colored_level(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    match level {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level(record.level()),
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (dispatch/executor.rs:42)"
fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
        "thread": std::thread::current().name().unwrap_or("unnamed"),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

// eventstack::dispatch::queue -> dispatch/queue.rs
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("eventstack::") {
        Some(without_prefix) => without_prefix.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line_num) => format!("{}:{}", path_like, line_num),
        None => path_like,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(
        format: fn(
            &mut dyn std::io::Write,
            &mut flexi_logger::DeferredNow,
            &log::Record,
        ) -> Result<(), std::io::Error>,
        target: &str,
    ) -> String {
        let mut buffer = Vec::new();
        let mut now = flexi_logger::DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Warn)
            .target(target)
            .line(Some(42))
            .args(format_args!("Event of type 3 dropped"))
            .build();

        format(&mut buffer, &mut now, &record).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_simple_format_layout() {
        let output = render(simple_format, "eventstack::dispatch::queue");
        assert!(output.contains("WRN Event of type 3 dropped"), "got: {output}");
        assert!(!output.contains("queue.rs"));
    }

    #[test]
    fn test_extended_format_includes_location() {
        let output = render(extended_format, "eventstack::dispatch::queue");
        assert!(
            output.ends_with("(dispatch/queue.rs:42)"),
            "got: {output}"
        );
    }

    #[test]
    fn test_json_format_is_one_object() {
        let output = render(json_format, "eventstack::dispatch::executor");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["level"], "WRN");
        assert_eq!(value["message"], "Event of type 3 dropped");
        assert_eq!(value["target"], "dispatch/executor.rs:42");
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_foreign_targets_keep_their_path() {
        assert_eq!(format_target_as_path("flexi_logger::writers", None), "flexi_logger/writers");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(-3), "error");
        assert_eq!(level_for_verbosity(-1), "warn");
        assert_eq!(level_for_verbosity(0), "info");
        assert_eq!(level_for_verbosity(1), "debug");
        assert_eq!(level_for_verbosity(5), "trace");
    }
}
