use std::collections::BTreeMap;
use std::path::PathBuf;

/// PATH-lookup collaborator for prerequisite utilities.
pub trait ToolProbe {
    fn find(&self, tool: &str) -> Option<PathBuf>;
}

/// Real PATH lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathProbe;

impl ToolProbe for PathProbe {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        which::which(tool).ok()
    }
}

/// Fixed tool table for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    available: BTreeMap<String, PathBuf>,
}

impl StaticProbe {
    pub fn with(mut self, tool: &str) -> Self {
        self.available
            .insert(tool.to_string(), PathBuf::from(format!("/usr/bin/{tool}")));
        self
    }
}

impl ToolProbe for StaticProbe {
    fn find(&self, tool: &str) -> Option<PathBuf> {
        self.available.get(tool).cloned()
    }
}
