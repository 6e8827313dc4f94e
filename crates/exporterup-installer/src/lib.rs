//! Host-mutating half of the tool: filesystem layout, timestamped backups,
//! artifact fetch and extraction, and binary/unit deployment. Everything here
//! assumes root and a real run; the dry-run path never reaches this crate.

mod backup;
mod deploy;
mod fetch;
mod layout;

pub use backup::{file_sha256, restore_backup, take_backup};
pub use deploy::{install_binary, install_unit};
pub use fetch::{artifact_file_name, artifact_url, fetch_binary, ScratchDir};
pub use layout::InstallLayout;
