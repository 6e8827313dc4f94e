use semver::Version;

/// Parse a single token as a version, tolerating a leading `v` and trailing
/// punctuation (`1.8.2`, `v1.8.2`, `1.8.2,`).
pub fn parse_version_token(raw: &str) -> Option<Version> {
    let trimmed = raw
        .trim()
        .trim_start_matches('v')
        .trim_end_matches(|c: char| !c.is_ascii_alphanumeric());
    Version::parse(trimmed).ok()
}

/// Pull the first version token out of a binary's `--version` self-report.
///
/// Exporters print banners like
/// `node_exporter, version 1.8.2 (branch: HEAD, revision: ...)`; the first
/// whitespace-separated token that parses as a version wins. Returns `None`
/// when no token parses, which callers treat as "not installed" rather than
/// an error.
pub fn extract_version(output: &str) -> Option<Version> {
    output
        .split_whitespace()
        .find_map(parse_version_token)
}
