//! Installing, reinstalling and uninstalling caves

pub mod folder;
pub mod locks;
pub mod orchestrator;
pub mod performer;
pub mod runtime;
mod uninstall;

pub use folder::{ensure_unique_install_folder, install_folder_name};
pub use locks::{CaveGuard, CaveLocks};
pub use orchestrator::{InstallReason, Installer, QueueInstallOptions};
pub use performer::{InstallPerformer, NakedInstaller, PerformInstall};
pub use runtime::{Platform, Runtime};
