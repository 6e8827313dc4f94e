/// Normalized CPU architecture tag used to select the downloadable artifact.
///
/// The set is closed: release artifacts are only published for these four
/// targets, and an unrecognized machine string falls back to `Amd64` rather
/// than failing the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchTag {
    Amd64,
    Arm64,
    Armv7,
    Ppc64le,
}

impl ArchTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Armv7 => "armv7",
            Self::Ppc64le => "ppc64le",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "amd64" => Some(Self::Amd64),
            "arm64" => Some(Self::Arm64),
            "armv7" => Some(Self::Armv7),
            "ppc64le" => Some(Self::Ppc64le),
            _ => None,
        }
    }

    /// Map a raw `uname -m` machine string onto the closed tag set.
    pub fn from_machine(machine: &str) -> Self {
        match machine.trim() {
            "x86_64" => Self::Amd64,
            "aarch64" => Self::Arm64,
            "armv7l" => Self::Armv7,
            "ppc64le" => Self::Ppc64le,
            _ => Self::Amd64,
        }
    }
}

impl std::fmt::Display for ArchTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
