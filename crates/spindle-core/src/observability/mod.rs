//! Logging setup and pass reports.

mod logger;
mod report;

pub use logger::{LoggerConfig, LoggerFormat, logger_init};
pub use report::PassReport;
