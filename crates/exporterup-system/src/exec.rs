use std::fmt;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

/// A command as a program plus an argument list. Arguments are never
/// composed into a shell string, so there is no quoting or injection
/// surface anywhere in the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Process-execution collaborator. The host implementation spawns real
/// processes; tests substitute a scripted one.
///
/// `run` errors only when the process could not be started; a started
/// process that exits non-zero is reported through `CommandOutput::success`.
pub trait CommandRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HostRunner;

impl CommandRunner for HostRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .output()
            .with_context(|| format!("failed to start command: {spec}"))?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Run a command and fold a non-zero exit into a single error carrying the
/// captured output.
pub fn run_ok(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
    context_message: &str,
) -> Result<CommandOutput> {
    let output = runner.run(spec)?;
    if output.success {
        return Ok(output);
    }

    Err(anyhow!(
        "{context_message}: '{spec}' failed stdout='{}' stderr='{}'",
        output.stdout.trim(),
        output.stderr.trim()
    ))
}

/// The single seam every mutating command goes through. In dry-run mode the
/// command is logged and skipped, and a synthetic success is returned so
/// callers stay uniform. Read-only probes bypass this and use the runner
/// directly.
#[derive(Clone, Copy)]
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, dry_run: bool) -> Self {
        Self { runner, dry_run }
    }

    pub fn runner(&self) -> &'a dyn CommandRunner {
        self.runner
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn execute(&self, spec: &CommandSpec, context_message: &str) -> Result<CommandOutput> {
        if self.dry_run {
            tracing::info!(command = %spec, "dry run, skipping: {context_message}");
            return Ok(CommandOutput::ok(""));
        }

        tracing::debug!(command = %spec, "{context_message}");
        run_ok(self.runner, spec, context_message)
    }
}
