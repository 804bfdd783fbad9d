//! Command implementations

pub mod check;
pub mod cherry_pick;
pub mod hooks;
pub mod init;
pub mod pull;

pub use check::run_check;
pub use cherry_pick::run_cherry_pick;
pub use hooks::run_hooks_install;
pub use init::run_init;
pub use pull::run_pull;
