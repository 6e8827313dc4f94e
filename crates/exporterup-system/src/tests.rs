use std::fs;
use std::path::PathBuf;

use exporterup_core::ArchTag;

use super::*;

fn test_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    path.push(format!(
        "exporterup-system-tests-{}-{}",
        std::process::id(),
        nanos
    ));
    fs::create_dir_all(&path).expect("must create test dir");
    path
}

fn write_executable(path: &PathBuf, contents: &[u8]) {
    fs::write(path, contents).expect("must write file");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("must set permissions");
    }
}

#[test]
fn architecture_probe_maps_machine_strings() {
    let runner = ScriptedRunner::new().on("uname", &["-m"], CommandOutput::ok("aarch64\n"));
    assert_eq!(detect_architecture(&runner), ArchTag::Arm64);
}

#[test]
fn architecture_probe_defaults_to_amd64_on_failure() {
    let runner = ScriptedRunner::new().on("uname", &["-m"], CommandOutput::failed("boom"));
    assert_eq!(detect_architecture(&runner), ArchTag::Amd64);

    // Unscripted uname (spawn failure) also falls back.
    let runner = ScriptedRunner::new();
    assert_eq!(detect_architecture(&runner), ArchTag::Amd64);
}

#[test]
fn version_probe_absent_binary_is_none() {
    let dir = test_dir();
    let runner = ScriptedRunner::new();
    assert_eq!(
        detect_installed_version(&runner, &dir.join("missing")),
        None
    );
    assert!(runner.calls().is_empty());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_probe_parses_self_report() {
    let dir = test_dir();
    let binary = dir.join("node_exporter");
    write_executable(&binary, b"\x7fELF fake");

    let runner = ScriptedRunner::new().on(
        binary.display().to_string().as_str(),
        &["--version"],
        CommandOutput::ok("node_exporter, version 1.8.2 (branch: HEAD)"),
    );
    let detected = detect_installed_version(&runner, &binary).expect("must detect");
    assert_eq!(detected.to_string(), "1.8.2");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_probe_reads_stderr_banner() {
    let dir = test_dir();
    let binary = dir.join("node_exporter");
    write_executable(&binary, b"\x7fELF fake");

    let runner = ScriptedRunner::new().on(
        binary.display().to_string().as_str(),
        &["--version"],
        CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: "node_exporter, version 0.18.1".to_string(),
        },
    );
    let detected = detect_installed_version(&runner, &binary).expect("must detect");
    assert_eq!(detected.to_string(), "0.18.1");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_probe_unparseable_banner_is_none() {
    let dir = test_dir();
    let binary = dir.join("node_exporter");
    write_executable(&binary, b"\x7fELF fake");

    let runner = ScriptedRunner::new().on(
        binary.display().to_string().as_str(),
        &["--version"],
        CommandOutput::ok("no version here"),
    );
    assert_eq!(detect_installed_version(&runner, &binary), None);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn service_query_never_errors() {
    let runner =
        ScriptedRunner::new().on("systemctl", &["is-active"], CommandOutput::ok("active"));
    assert!(is_active(&runner, "node_exporter"));

    let runner =
        ScriptedRunner::new().on("systemctl", &["is-active"], CommandOutput::failed("inactive"));
    assert!(!is_active(&runner, "node_exporter"));

    // Unscripted systemctl (manager unreachable) reads as inactive.
    let runner = ScriptedRunner::new();
    assert!(!is_active(&runner, "node_exporter"));
}

#[test]
fn stop_if_active_only_stops_running_service() {
    let runner = ScriptedRunner::new()
        .on("systemctl", &["is-active"], CommandOutput::ok("active"))
        .on("systemctl", &["stop"], CommandOutput::ok(""));
    let executor = Executor::new(&runner, false);
    assert!(stop_if_active(&executor, "node_exporter").expect("must stop"));
    assert_eq!(runner.calls_for("systemctl").len(), 2);

    let runner =
        ScriptedRunner::new().on("systemctl", &["is-active"], CommandOutput::failed(""));
    let executor = Executor::new(&runner, false);
    assert!(!stop_if_active(&executor, "node_exporter").expect("must be noop"));
    assert_eq!(runner.calls_for("systemctl").len(), 1);
}

#[test]
fn enable_and_start_issues_enable_then_restart() {
    let runner = ScriptedRunner::new()
        .on("systemctl", &["enable"], CommandOutput::ok(""))
        .on("systemctl", &["restart"], CommandOutput::ok(""));
    let executor = Executor::new(&runner, false);
    enable_and_start(&executor, "node_exporter").expect("must succeed");

    let enable = runner
        .first_call_index("systemctl", &["enable"])
        .expect("enable must run");
    let restart = runner
        .first_call_index("systemctl", &["restart"])
        .expect("restart must run");
    assert!(enable < restart);
}

#[test]
fn account_creation_is_idempotent() {
    let runner = ScriptedRunner::new().on("getent", &[], CommandOutput::ok("exporter:x:990:"));
    let executor = Executor::new(&runner, false);
    ensure_service_account(&executor, "exporter", "exporter").expect("must succeed");
    assert!(runner.calls_for("groupadd").is_empty());
    assert!(runner.calls_for("useradd").is_empty());
}

#[test]
fn account_creation_adds_missing_group_and_user() {
    let runner = ScriptedRunner::new()
        .on("getent", &[], CommandOutput::failed(""))
        .on("groupadd", &["--system"], CommandOutput::ok(""))
        .on("useradd", &["--system"], CommandOutput::ok(""));
    let executor = Executor::new(&runner, false);
    ensure_service_account(&executor, "exporter", "exporter").expect("must succeed");
    assert_eq!(runner.calls_for("groupadd").len(), 1);
    assert_eq!(runner.calls_for("useradd").len(), 1);
}

#[test]
fn prerequisites_present_is_noop() {
    let runner = ScriptedRunner::new();
    let executor = Executor::new(&runner, false);
    let tools = StaticProbe::default().with("curl").with("tar");
    ensure_prerequisites(&executor, &tools).expect("must be noop");
    assert!(runner.calls().is_empty());
}

#[test]
fn prerequisites_wget_satisfies_download_tool() {
    let runner = ScriptedRunner::new();
    let executor = Executor::new(&runner, false);
    let tools = StaticProbe::default().with("wget").with("tar");
    ensure_prerequisites(&executor, &tools).expect("must be noop");
    assert!(runner.calls().is_empty());
}

#[test]
fn prerequisites_installed_through_package_manager() {
    let runner = ScriptedRunner::new().on("apt-get", &["install"], CommandOutput::ok(""));
    let executor = Executor::new(&runner, false);
    let tools = StaticProbe::default().with("tar").with("apt-get");
    ensure_prerequisites(&executor, &tools).expect("must install curl");
    let installs = runner.calls_for("apt-get");
    assert_eq!(installs.len(), 1);
    assert!(installs[0].args.contains(&"curl".to_string()));
}

#[test]
fn prerequisites_without_package_manager_fail() {
    let runner = ScriptedRunner::new();
    let executor = Executor::new(&runner, false);
    let tools = StaticProbe::default();
    let err = ensure_prerequisites(&executor, &tools).expect_err("must fail");
    assert!(format!("{err:#}").contains("no supported package manager"));
}

#[test]
fn package_manager_detection_order() {
    let tools = StaticProbe::default().with("pacman").with("dnf");
    assert_eq!(PackageManager::detect(&tools), Some(PackageManager::Dnf));
    assert_eq!(PackageManager::detect(&StaticProbe::default()), None);
}

#[test]
fn dry_run_executor_skips_commands() {
    let runner = ScriptedRunner::new();
    let executor = Executor::new(&runner, true);
    let output = executor
        .execute(
            &CommandSpec::new("systemctl").args(["stop", "node_exporter"]),
            "stop",
        )
        .expect("dry run must succeed");
    assert!(output.success);
    assert!(runner.calls().is_empty());
}

#[test]
fn run_ok_reports_captured_output() {
    let runner = ScriptedRunner::new().on("tar", &[], CommandOutput::failed("gzip: not found"));
    let spec = CommandSpec::new("tar").args(["-xf", "/tmp/a.tar.gz"]);
    let err = run_ok(&runner, &spec, "failed to extract archive").expect_err("must fail");
    let message = format!("{err:#}");
    assert!(message.contains("failed to extract archive"));
    assert!(message.contains("gzip: not found"));
}

#[test]
fn command_spec_display_joins_args() {
    let spec = CommandSpec::new("systemctl").args(["enable", "node_exporter"]);
    assert_eq!(spec.to_string(), "systemctl enable node_exporter");
}
