//! Stderr backend for the `log` facade.
use chrono::Local;
use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub const LOG_ENV: &str = "SWITCH_TAG_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".dimmed(),
        };
        let time = Local::now().format("%H:%M:%S%.3f").to_string();
        eprintln!("{} {level} {}: {}", time.dimmed(), record.target(), record.args());
    }

    fn flush(&self) {}
}

/// `-v` flags win; without them the environment decides; default is warnings.
pub fn level_for(verbosity: u8, env: Option<&str>) -> LevelFilter {
    match verbosity {
        0 => env
            .and_then(|s| s.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbosity: u8) {
    let env = std::env::var(LOG_ENV).ok();
    let level = level_for(verbosity, env.as_deref());
    // Only fails if a logger is already installed, which leaves that one in charge.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
