use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use super::devlog::DEVLOG_TARGET;

const ENCODER_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Initializes logging from `log4rs.yaml` in the working directory, if present.
/// Prefer `configure_logging` for programmatic control.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if Path::new("log4rs.yaml").exists() {
        log4rs::init_file("log4rs.yaml", log4rs::config::Deserializers::default())?;
    }
    Ok(())
}

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling_appender(
    base: &Path,
    stem: &str,
    keep: u32,
) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE_BYTES)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(ENCODER_PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds the log4rs config without installing it.
///
/// Writes `docwire.log` in `dir` (current directory when `None`). When `devlog` is true, trace
/// lines from the `devlog!` macro are also persisted to `devlog.log`.
pub fn build_config(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    devlog: bool,
) -> Result<Config, Box<dyn std::error::Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level.unwrap_or("info"));

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling_appender(&base, "docwire", keep)?)));
    if devlog {
        builder = builder
            .appender(Appender::builder().build("devlog", Box::new(rolling_appender(&base, "devlog", keep)?)))
            .logger(
                Logger::builder()
                    .appender("devlog")
                    .additive(false)
                    .build(DEVLOG_TARGET, LevelFilter::Trace),
            );
    } else {
        builder = builder.logger(Logger::builder().additive(false).build(DEVLOG_TARGET, LevelFilter::Off));
    }
    Ok(builder.build(Root::builder().appender("app").build(lvl))?)
}

/// Configure logging globally for the process. A second call in the same process is ignored by
/// log4rs; the error is swallowed so callers may configure opportunistically.
/// - dir: base directory for logs; if None, current directory.
/// - level: off|error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    devlog: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, level, retention, devlog)?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Configure logging from environment variables if present:
/// - DOCWIRE_LOG_DIR
/// - DOCWIRE_LOG_LEVEL
/// - DOCWIRE_LOG_RETENTION
/// - DOCWIRE_DEVLOG
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::var("DOCWIRE_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("DOCWIRE_LOG_LEVEL").ok();
    let retention =
        std::env::var("DOCWIRE_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    let devlog = std::env::var("DOCWIRE_DEVLOG")
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    configure_logging(dir.as_deref(), level.as_deref(), retention, devlog)
}
