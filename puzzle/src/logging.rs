//! log4rs setup shared by the binaries. Libraries only use the `log` facade.

use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
};

pub const LOG_LEVEL_ENV: &str = "ROCKPASTE_LOG";

const CONSOLE_PATTERN: &str = "{h({l:<5})} {t} {m}{n}";
const FILE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} {t} {m}{n}";

#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    #[error("log file: {0}")]
    Io(#[from] std::io::Error),
    #[error("log config: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("logger already set: {0}")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// `--verbose` wins, then `ROCKPASTE_LOG`, then `info`.
pub fn resolve_level<F>(verbose: bool, mut get_env: F) -> LevelFilter
where
    F: FnMut(&str) -> Option<String>,
{
    if verbose {
        return LevelFilter::Debug;
    }
    get_env(LOG_LEVEL_ENV)
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(LevelFilter::Info)
}

/// Console logging on stderr, plus a plain file log when `file` is given.
pub fn init_log(level: LevelFilter, file: Option<&Path>) -> Result<(), LogInitError> {
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    let mut config = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(level)))
            .build("console", Box::new(console)),
    );
    let mut root = Root::builder().appender("console");

    if let Some(path) = file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
            .build(path)?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config.build(root.build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_env() {
        let level = resolve_level(true, |_| Some("error".to_string()));
        assert_eq!(level, LevelFilter::Debug);
    }

    #[test]
    fn env_level_is_parsed_case_insensitively() {
        assert_eq!(resolve_level(false, |_| Some("WARN".to_string())), LevelFilter::Warn);
        assert_eq!(resolve_level(false, |_| Some("nonsense".to_string())), LevelFilter::Info);
        assert_eq!(resolve_level(false, |_| None), LevelFilter::Info);
    }
}
