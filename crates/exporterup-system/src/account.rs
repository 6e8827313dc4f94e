use anyhow::Result;

use crate::exec::{CommandRunner, CommandSpec, Executor};

/// Create the service account (group, then user) when missing. Re-running
/// against an existing account is a no-op, not an error.
pub fn ensure_service_account(executor: &Executor<'_>, user: &str, group: &str) -> Result<()> {
    if !entity_exists(executor.runner(), "group", group) {
        executor.execute(
            &CommandSpec::new("groupadd").args(["--system", group]),
            "failed to create service group",
        )?;
    }

    if !entity_exists(executor.runner(), "passwd", user) {
        executor.execute(
            &CommandSpec::new("useradd").args([
                "--system",
                "--no-create-home",
                "--shell",
                "/usr/sbin/nologin",
                "--gid",
                group,
                user,
            ]),
            "failed to create service user",
        )?;
    }

    Ok(())
}

fn entity_exists(runner: &dyn CommandRunner, database: &str, name: &str) -> bool {
    runner
        .run(&CommandSpec::new("getent").args([database, name]))
        .map(|output| output.success)
        .unwrap_or(false)
}
