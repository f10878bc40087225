//! Process-level plumbing shared by Pulse binaries: layered configuration
//! loading and `tracing` subscriber setup.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, LoggingConfig, Section, ServerConfig,
};
