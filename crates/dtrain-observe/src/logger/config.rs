use std::io::IsTerminal;

use crate::logger::{format::LoggerFormat, level::LoggerLevel};

/// Launcher logs go to stderr; stdout belongs to the supervised processes.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    pub fn new(format: LoggerFormat, level: LoggerLevel) -> Self {
        Self {
            format,
            level,
            ..Default::default()
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: std::io::stderr().is_terminal(),
        }
    }
}
