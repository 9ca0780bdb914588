//! CLI command implementations

pub mod config;
pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;

pub use config::execute as config;
pub use install::execute as install;
pub use install::reinstall;
pub use list::execute as list;
pub use show::execute as show;
pub use uninstall::execute as uninstall;
