use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

pub const DEFAULT_ARTIFACTS_DIR: &str = "./artifacts";
pub const DEFAULT_CACHE_DIR: &str = "./cache";
pub const DEFAULT_SOURCES_DIR: &str = "./contracts";
pub const DEFAULT_TESTS_DIR: &str = "./test";

/// Project directory layout. Relative entries are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectPaths {
    /// Compiler output, written by the build tool
    pub artifacts: String,
    /// Compiler cache, written by the build tool
    pub cache: String,
    /// Contract sources, read by the build tool
    pub sources: String,
    /// Test files, read by the test runner
    pub tests: String,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            artifacts: DEFAULT_ARTIFACTS_DIR.to_string(),
            cache: DEFAULT_CACHE_DIR.to_string(),
            sources: DEFAULT_SOURCES_DIR.to_string(),
            tests: DEFAULT_TESTS_DIR.to_string(),
        }
    }
}

/// Absolute project directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub artifacts: PathBuf,
    pub cache: PathBuf,
    pub sources: PathBuf,
    pub tests: PathBuf,
}

impl ProjectPaths {
    pub(crate) fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("artifacts", &self.artifacts),
            ("cache", &self.cache),
            ("sources", &self.sources),
            ("tests", &self.tests),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyPath(field));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            root: root.to_path_buf(),
            artifacts: join_root(root, &self.artifacts),
            cache: join_root(root, &self.cache),
            sources: join_root(root, &self.sources),
            tests: join_root(root, &self.tests),
        }
    }
}

fn join_root(root: &Path, entry: &str) -> PathBuf {
    let entry = Path::new(entry);
    if entry.is_absolute() {
        return entry.to_path_buf();
    }
    // Drop "./" so joined paths read cleanly
    let relative = entry.strip_prefix(".").unwrap_or(entry);
    root.join(relative)
}
