//! log4rs setup. Application logs go to `app.log`; key loads, signatures and verification
//! outcomes are routed through the `keysigner::audit` target into `audit.log`.

use crate::config::SignerConfig;
use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: usize = 7;

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{name}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Build the app + audit configuration rooted at `base`.
///
/// # Errors
/// Returns an error if the directory cannot be created or an appender cannot open its file.
pub fn build_config(base: &Path, level: LevelFilter, retention: u32) -> Result<Config, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(base)?;
    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(base, "app", retention)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(base, "audit", retention)?)))
        .logger(Logger::builder().appender("audit").additive(false).build("keysigner::audit", level))
        .build(Root::builder().appender("app").build(level))?;
    Ok(config)
}

/// Where, how verbosely and how long to log, as resolved from a [`SignerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub level: LevelFilter,
    pub retention: u32,
}

impl LogSettings {
    /// `None` when no log directory is configured; file logging stays off.
    #[must_use]
    pub fn from_config(cfg: &SignerConfig) -> Option<Self> {
        let dir = cfg.log_dir.clone()?;
        Some(Self {
            dir,
            level: parse_level(cfg.log_level.as_deref()),
            retention: u32::try_from(cfg.log_retention.unwrap_or(DEFAULT_RETENTION)).unwrap_or(u32::MAX),
        })
    }
}

/// Install the log4rs configuration described by `cfg`, if it names a log directory.
/// Returns whether a logger was installed.
///
/// # Errors
/// Returns an error if the configuration cannot be built or a logger is already installed.
pub fn configure_from_config(cfg: &SignerConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(settings) = LogSettings::from_config(cfg) else {
        return Ok(false);
    };
    log4rs::init_config(build_config(&settings.dir, settings.level, settings.retention)?)?;
    Ok(true)
}
