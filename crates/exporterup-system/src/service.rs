use anyhow::Result;

use crate::exec::{CommandRunner, CommandSpec, Executor};

/// Query the service manager. An unreachable manager or an unknown unit
/// both read as inactive; this never fails the run.
pub fn is_active(runner: &dyn CommandRunner, service: &str) -> bool {
    runner
        .run(&CommandSpec::new("systemctl").args(["is-active", service]))
        .map(|output| output.success)
        .unwrap_or(false)
}

/// Stop the service when it is running. Returns whether a stop was issued.
pub fn stop_if_active(executor: &Executor<'_>, service: &str) -> Result<bool> {
    if !is_active(executor.runner(), service) {
        return Ok(false);
    }

    executor.execute(
        &CommandSpec::new("systemctl").args(["stop", service]),
        "failed to stop service",
    )?;
    Ok(true)
}

pub fn daemon_reload(executor: &Executor<'_>) -> Result<()> {
    executor.execute(
        &CommandSpec::new("systemctl").arg("daemon-reload"),
        "failed to reload unit cache",
    )?;
    Ok(())
}

pub fn enable_and_start(executor: &Executor<'_>, service: &str) -> Result<()> {
    executor.execute(
        &CommandSpec::new("systemctl").args(["enable", service]),
        "failed to enable service",
    )?;
    executor.execute(
        &CommandSpec::new("systemctl").args(["restart", service]),
        "failed to start service",
    )?;
    Ok(())
}
