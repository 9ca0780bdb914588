//! Cavern - install games into caves
//!
//! Runs installs, reinstalls and uninstalls as tracked, cancellable tasks.
//! Each installed copy of a game is a cave: a persisted record naming its
//! install location, folder and installed version.

pub mod cli;
pub mod config;
pub mod disk;
pub mod dispatch;
pub mod error;
pub mod install;
pub mod model;
pub mod paths;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{CavernError, CavernResult};
