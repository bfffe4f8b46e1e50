//! schemagen command-line driver: configuration, logging and the
//! parse -> resolve -> generate pipeline.

pub mod config;
pub mod logging;
pub mod pipeline;

pub use config::{Config, ConfigError};
pub use pipeline::{compile, compile_file, write, Artifacts, PipelineError, Targets};
