//! The host's vault: the notes folder a workspace is rooted in.

use std::path::{Path, PathBuf};

/// Filesystem context for a workspace.
///
/// Some hosts run without a local folder (remote or sandboxed vaults) and
/// report an empty base path; shells then start in the spawning process's
/// own working directory instead.
#[derive(Debug, Clone, Default)]
pub struct Vault {
    base_path: Option<PathBuf>,
}

impl Vault {
    /// A vault rooted at `base_path`. An empty path means no local folder.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let path = base_path.into();
        Self {
            base_path: (!path.as_os_str().is_empty()).then_some(path),
        }
    }

    /// A vault with no local folder.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }
}
