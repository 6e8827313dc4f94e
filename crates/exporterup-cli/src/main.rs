use std::path::PathBuf;

use clap::Parser;

use exporterup_core::{
    Action, DesiredState, RunSettings, SettingsDefaults, SettingsOverrides, SetupError, Summary,
};
use exporterup_system::{effective_root, HostRunner, PathProbe, SystemClock};

use crate::lifecycle::LifecycleController;
use crate::render::TerminalRenderer;

mod lifecycle;
mod render;

#[derive(Parser, Debug)]
#[command(name = "exporterup")]
#[command(about = "Install and upgrade the node metrics exporter as a systemd service", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// What to do: install or update
    #[arg(long, env = "EXPORTERUP_ACTION")]
    action: String,

    /// Exporter version to put on the host, e.g. 1.8.2
    #[arg(long = "version", env = "EXPORTERUP_VERSION")]
    version: String,

    /// Report what would change without touching the host
    #[arg(long, env = "EXPORTERUP_DRY_RUN")]
    dry_run: bool,

    /// Extra flags appended to the exporter's ExecStart line
    #[arg(long, env = "EXPORTERUP_FLAGS", default_value = "")]
    flags: String,

    #[arg(long, env = "EXPORTERUP_SERVICE_NAME")]
    service_name: Option<String>,

    #[arg(long, env = "EXPORTERUP_USER")]
    user: Option<String>,

    #[arg(long, env = "EXPORTERUP_GROUP")]
    group: Option<String>,

    #[arg(long, env = "EXPORTERUP_INSTALL_DIR")]
    install_dir: Option<PathBuf>,

    #[arg(long, env = "EXPORTERUP_BINARY_DIR")]
    binary_dir: Option<PathBuf>,

    #[arg(long, env = "EXPORTERUP_UNIT_DIR")]
    unit_dir: Option<PathBuf>,

    #[arg(long, env = "EXPORTERUP_BACKUP_DIR")]
    backup_dir: Option<PathBuf>,

    /// Base URL releases are fetched from
    #[arg(long, env = "EXPORTERUP_DOWNLOAD_BASE")]
    download_base: Option<String>,

    /// TOML file with default settings, overridden by flags and environment
    #[arg(long, env = "EXPORTERUP_DEFAULTS")]
    defaults: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let mut renderer = TerminalRenderer::current();
    match run(cli, &mut renderer) {
        Ok(summary) => renderer.print_summary(&summary),
        Err(error) => {
            let code = error.exit_code();
            renderer.print_error(&error);
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli, renderer: &mut TerminalRenderer) -> Result<Summary, SetupError> {
    let action = Action::parse(&cli.action)
        .ok_or_else(|| SetupError::config(format!("unknown action: '{}'", cli.action)))?;

    let defaults = match &cli.defaults {
        Some(path) => SettingsDefaults::load(path)
            .map_err(|error| SetupError::config(format!("{error:#}")))?,
        None => SettingsDefaults::default(),
    };
    let overrides = SettingsOverrides {
        service_name: cli.service_name,
        user: cli.user,
        group: cli.group,
        install_dir: cli.install_dir,
        binary_dir: cli.binary_dir,
        unit_dir: cli.unit_dir,
        backup_dir: cli.backup_dir,
        download_base: cli.download_base,
    };
    let settings = RunSettings::resolve(overrides, defaults);

    let desired = DesiredState {
        action,
        target_version: cli.version,
        extra_flags: cli.flags,
        dry_run: cli.dry_run,
        settings,
    };

    renderer.print_status(
        desired.action.as_str(),
        &format!(
            "{} {}{}",
            desired.settings.service_name,
            desired.target_version,
            if desired.dry_run { " (dry run)" } else { "" }
        ),
    );

    let runner = HostRunner;
    let tools = PathProbe;
    let clock = SystemClock;
    let controller = LifecycleController::new(&runner, &tools, &clock, effective_root());
    controller.run(&desired, renderer)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
