//! Command-line interface

pub mod args;
pub mod commands;
mod services;

pub use args::{Cli, Commands};
pub use services::Services;
