use semver::Version;

use exporterup_core::{
    render_unit, ArchTag, BackupRecord, DeploymentPlan, DesiredState, ObservedState, SetupError,
    Summary,
};
use exporterup_installer::{
    fetch_binary, install_binary, install_unit, restore_backup, take_backup, InstallLayout,
    ScratchDir,
};
use exporterup_system::{
    daemon_reload, enable_and_start, ensure_prerequisites, ensure_service_account, observe,
    stop_if_active, Clock, CommandRunner, Executor, ToolProbe,
};

/// Phase callback for terminal progress. Tests pass a silent one.
pub trait StepObserver {
    fn step(&mut self, label: &str);
}

pub struct SilentObserver;

impl StepObserver for SilentObserver {
    fn step(&mut self, _label: &str) {}
}

/// The whole run as one state machine: validate, observe, plan, then either
/// report (dry run) or mutate with rollback armed once a backup exists.
pub struct LifecycleController<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a dyn ToolProbe,
    clock: &'a dyn Clock,
    is_root: bool,
}

impl<'a> LifecycleController<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a dyn ToolProbe,
        clock: &'a dyn Clock,
        is_root: bool,
    ) -> Self {
        Self {
            runner,
            tools,
            clock,
            is_root,
        }
    }

    pub fn run(
        &self,
        desired: &DesiredState,
        observer: &mut dyn StepObserver,
    ) -> Result<Summary, SetupError> {
        let target = self.validate(desired)?;
        let layout = InstallLayout::from_settings(&desired.settings);

        observer.step("observing host");
        let observed = observe(
            self.runner,
            &layout.binary_path,
            &desired.settings.service_name,
        );
        tracing::info!(
            installed = ?observed.installed_version.as_ref().map(ToString::to_string),
            binary_present = observed.binary_present,
            service_active = observed.service_active,
            architecture = %observed.architecture,
            "host observed"
        );

        let plan = DeploymentPlan::compute(&target, &observed);

        if desired.dry_run {
            return Ok(self.report_plan(desired, &observed, plan, &target));
        }

        let executor = Executor::new(self.runner, false);

        observer.step("preparing host");
        self.prepare(&executor, desired, &layout)?;

        if !plan.need_install {
            return self.already_at_target(&executor, desired, &observed, &layout, observer);
        }

        let mut backup = None;
        if plan.need_update {
            observer.step("backing up current install");
            backup = Some(self.stop_and_backup(&executor, desired, &layout)?);
        }

        match self.fetch_and_deploy(
            &executor,
            desired,
            &layout,
            &target,
            observed.architecture,
            observer,
        ) {
            Ok(()) => Ok(Summary {
                action: desired.action,
                installed_version: target.to_string(),
                mutated: true,
                dry_run: false,
                backup,
            }),
            Err(error) => Err(self.fail(&executor, desired, &layout, backup.as_ref(), error)),
        }
    }

    /// Reject bad input before touching the host. Root is only needed when
    /// the run will mutate.
    fn validate(&self, desired: &DesiredState) -> Result<Version, SetupError> {
        let Some(target) = desired.target() else {
            return Err(SetupError::config(format!(
                "target version is not a valid version: '{}'",
                desired.target_version
            )));
        };

        if !desired.dry_run && !self.is_root {
            return Err(SetupError::config(
                "administrative privileges are required; re-run as root or use --dry-run",
            ));
        }

        Ok(target)
    }

    /// Dry run: log what a real run would do and change nothing. No backup,
    /// no downloads, no service commands.
    fn report_plan(
        &self,
        desired: &DesiredState,
        observed: &ObservedState,
        plan: DeploymentPlan,
        target: &Version,
    ) -> Summary {
        tracing::info!(
            binary = %desired.settings.binary_path().display(),
            unit = %desired.settings.unit_path().display(),
            backups = %desired.settings.backup_dir.display(),
            "resolved paths"
        );

        if plan.need_update {
            tracing::info!(
                from = ?observed.installed_version.as_ref().map(ToString::to_string),
                to = %target,
                "dry run: would stop the service, back up, and update"
            );
        } else if plan.need_install {
            tracing::info!(to = %target, "dry run: would install fresh");
        } else {
            tracing::info!(version = %target, "dry run: already at target, nothing to do");
        }

        Summary {
            action: desired.action,
            installed_version: observed
                .installed_version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "none".to_string()),
            mutated: false,
            dry_run: true,
            backup: None,
        }
    }

    /// Pre-backup ground work. Failures here abort with the host untouched
    /// by the update itself, so no rollback applies.
    fn prepare(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        layout: &InstallLayout,
    ) -> Result<(), SetupError> {
        ensure_prerequisites(executor, self.tools)
            .map_err(|error| SetupError::tooling(format!("{error:#}")))?;
        ensure_service_account(executor, &desired.settings.user, &desired.settings.group)
            .map_err(|error| SetupError::deploy("service-account", format!("{error:#}")))?;
        layout
            .ensure_base_dirs()
            .and_then(|()| layout.ensure_ownership(executor, &desired.settings.owner()))
            .map_err(|error| SetupError::deploy("layout", format!("{error:#}")))?;
        Ok(())
    }

    /// Target version already installed. The only thing worth doing is
    /// reviving a stopped service; an active one is left completely alone.
    fn already_at_target(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        observed: &ObservedState,
        layout: &InstallLayout,
        observer: &mut dyn StepObserver,
    ) -> Result<Summary, SetupError> {
        let mut mutated = false;
        if !observed.service_active {
            observer.step("reviving service");
            tracing::info!("binary at target but service inactive, re-enabling");
            self.configure_service(executor, desired, layout)
                .map_err(|error| SetupError::deploy("service-revival", format!("{error:#}")))?;
            mutated = true;
        } else {
            tracing::info!("already at target version, nothing to do");
        }

        Ok(Summary {
            action: desired.action,
            installed_version: observed
                .installed_version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| desired.target_version.clone()),
            mutated,
            dry_run: false,
            backup: None,
        })
    }

    /// Quiesce the service and copy the current files aside. From the moment
    /// this returns, any later failure rolls back to this snapshot.
    fn stop_and_backup(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        layout: &InstallLayout,
    ) -> Result<BackupRecord, SetupError> {
        stop_if_active(executor, &desired.settings.service_name)
            .map_err(|error| SetupError::deploy("stop-service", format!("{error:#}")))?;
        take_backup(self.clock, layout)
            .map_err(|error| SetupError::deploy("backup", format!("{error:#}")))
    }

    fn fetch_and_deploy(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        layout: &InstallLayout,
        target: &Version,
        architecture: ArchTag,
        observer: &mut dyn StepObserver,
    ) -> Result<(), SetupError> {
        observer.step("fetching release");
        let scratch = ScratchDir::create(&layout.scratch_root())
            .map_err(|error| SetupError::deploy("scratch", format!("{error:#}")))?;
        let fetched = fetch_binary(
            executor,
            self.tools,
            &desired.settings.download_base,
            &desired.settings.service_name,
            &target.to_string(),
            architecture,
            &scratch,
        )?;

        observer.step("deploying");
        install_binary(
            executor,
            &fetched,
            &layout.binary_path,
            &desired.settings.owner(),
        )
        .map_err(|error| SetupError::deploy("install-binary", format!("{error:#}")))?;

        self.configure_service(executor, desired, layout)
            .map_err(|error| SetupError::deploy("configure-service", format!("{error:#}")))?;

        Ok(())
    }

    /// Render and install the unit, then reload and (re)start. Shared by the
    /// deploy path and service revival.
    fn configure_service(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        layout: &InstallLayout,
    ) -> anyhow::Result<()> {
        let unit = render_unit(&desired.settings, &desired.extra_flags);
        install_unit(&layout.unit_path, &unit)?;
        daemon_reload(executor)?;
        enable_and_start(executor, &desired.settings.service_name)?;
        Ok(())
    }

    /// Post-backup failure handling. With no backup the original error
    /// stands. With one, restore the snapshot exactly once and report the
    /// consolidated rollback error either way; getting the service running
    /// again is best effort and only logged.
    fn fail(
        &self,
        executor: &Executor<'_>,
        desired: &DesiredState,
        layout: &InstallLayout,
        backup: Option<&BackupRecord>,
        error: SetupError,
    ) -> SetupError {
        let Some(record) = backup else {
            return error;
        };

        tracing::warn!(%error, timestamp = record.timestamp, "update failed, rolling back");
        let restore_failed = match restore_backup(
            executor,
            record,
            layout,
            &desired.settings.owner(),
        ) {
            Ok(()) => {
                if let Err(revive_error) = daemon_reload(executor)
                    .and_then(|()| enable_and_start(executor, &desired.settings.service_name))
                {
                    tracing::warn!(
                        error = %format!("{revive_error:#}"),
                        "rollback restored files but the service did not restart"
                    );
                }
                false
            }
            Err(restore_error) => {
                tracing::error!(
                    error = %format!("{restore_error:#}"),
                    timestamp = record.timestamp,
                    "rollback failed, manual recovery required"
                );
                true
            }
        };

        SetupError::Rollback {
            timestamp: record.timestamp,
            detail: error.to_string(),
            restore_failed,
        }
    }
}
