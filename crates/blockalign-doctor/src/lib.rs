#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::run_from_env;
pub use error::{DoctorError, Result};
