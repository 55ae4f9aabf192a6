//! File logging through `log4rs`.
//!
//! The terminal belongs to the UI, so log records go to a file only.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, info};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};
use thiserror::Error;

use crate::config::{LoggingSettings, default_log_path};

const LOG_FORMAT_FILE: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:>5.5} [{T:>12.12}] {t:<24.24} : {m}{n}";
const FILE_APPENDER: &str = "file";

static INITIALIZED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("a logger instance has already been initialized")]
    AlreadyInitialized,
    #[error("no log file location could be determined")]
    NoLogPath,
    #[error("invalid log level {0:?}")]
    InvalidLevel(String),
    #[error("logging configuration is invalid, {0}")]
    InvalidConfig(String),
    #[error("an io error occurred, {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug)]
pub struct FileLogger {
    handle: Handle,
    path: PathBuf,
}

impl FileLogger {
    /// Install the global logger described by `settings`.
    pub fn init(settings: &LoggingSettings) -> Result<Self, LoggingError> {
        let level = settings
            .level
            .parse::<LevelFilter>()
            .map_err(|_| LoggingError::InvalidLevel(settings.level.clone()))?;
        let path = settings
            .path
            .clone()
            .or_else(default_log_path)
            .ok_or(LoggingError::NoLogPath)?;

        let config = Self::create_config(level, &path)?;

        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(LoggingError::AlreadyInitialized);
        }
        let handle = log4rs::init_config(config).map_err(|e| {
            INITIALIZED.store(false, Ordering::SeqCst);
            LoggingError::InvalidConfig(e.to_string())
        })?;
        info!("andante logger has been initialized at level {level}");
        Ok(Self { handle, path })
    }

    /// Returns the root logging level of the logger.
    pub fn root_log_level(&self) -> LevelFilter {
        self.handle.max_log_level()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_config(level: LevelFilter, path: &Path) -> Result<Config, LoggingError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_FORMAT_FILE)))
            .build(path)?;

        Config::builder()
            .appender(Appender::builder().build(FILE_APPENDER, Box::new(file)))
            // D-Bus chatter drowns out everything else at debug level.
            .logger(Logger::builder().build("zbus", LevelFilter::Warn))
            .build(Root::builder().appender(FILE_APPENDER).build(level))
            .map_err(|e| LoggingError::InvalidConfig(e.to_string()))
    }
}
