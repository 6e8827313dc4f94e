use crate::settings::RunSettings;

/// Render the systemd unit text for the exporter service.
///
/// The unit is re-rendered on every mutating run so flag or account changes
/// always reach the installed file.
pub fn render_unit(settings: &RunSettings, extra_flags: &str) -> String {
    let exec_start = if extra_flags.trim().is_empty() {
        settings.binary_path().display().to_string()
    } else {
        format!("{} {}", settings.binary_path().display(), extra_flags.trim())
    };

    format!(
        r#"[Unit]
Description={service} metrics exporter
Wants=network-online.target
After=network-online.target

[Service]
Type=simple
User={user}
Group={group}
ExecStart={exec_start}
Restart=on-failure
RestartSec=5
StandardOutput=journal
StandardError=journal

[Install]
WantedBy=multi-user.target
"#,
        service = settings.service_name,
        user = settings.user,
        group = settings.group,
        exec_start = exec_start,
    )
}
