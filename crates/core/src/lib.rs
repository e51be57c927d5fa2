//! Domain logic for the Temoa control panel.
//!
//! Everything here is free of HTTP types: the API crate maps requests onto
//! these functions and maps [`error::CoreError`] onto responses.

pub mod engine_config;
pub mod error;
pub mod files;
pub mod log_sink;
pub mod results;
pub mod run_config;
pub mod run_dir;
pub mod runner;
pub mod solvers;
pub mod subprocess;
pub mod tutorial;
pub mod types;
