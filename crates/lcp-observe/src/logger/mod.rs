mod config;
mod error;
mod format;
mod log;

pub use config::{LoggerConfig, LoggerTarget};
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global subscriber described by `cfg`. Call once per process.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Text => log::Logger::text(cfg),
        LoggerFormat::Json => log::Logger::json(cfg),
        LoggerFormat::Journald => log::Logger::journald(cfg),
    }
}
