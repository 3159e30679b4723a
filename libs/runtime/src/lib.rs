//! Process-level plumbing shared by the server binary: layered configuration
//! and logging initialisation.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, AuthConfig, CliArgs, DatabaseConfig, LoggingConfig,
    Section, ServerConfig,
};
