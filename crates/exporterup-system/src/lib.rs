mod account;
mod clock;
mod exec;
mod pkgmgr;
mod privilege;
mod probe;
mod scripted;
mod service;
mod tools;

pub use account::ensure_service_account;
pub use clock::{Clock, FixedClock, SystemClock};
pub use exec::{run_ok, CommandOutput, CommandRunner, CommandSpec, Executor, HostRunner};
pub use pkgmgr::{ensure_prerequisites, PackageManager};
pub use privilege::effective_root;
pub use probe::{detect_architecture, detect_installed_version, observe};
pub use scripted::ScriptedRunner;
pub use service::{daemon_reload, enable_and_start, is_active, stop_if_active};
pub use tools::{PathProbe, StaticProbe, ToolProbe};

#[cfg(test)]
mod tests;
