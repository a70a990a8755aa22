use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access mode a sandbox grants to its mounted workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkspaceAccess {
    #[serde(alias = "ro")]
    ReadOnly,
    #[serde(alias = "rw")]
    ReadWrite,
}

impl WorkspaceAccess {
    pub fn is_writable(self) -> bool {
        matches!(self, WorkspaceAccess::ReadWrite)
    }
}

impl fmt::Display for WorkspaceAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceAccess::ReadOnly => write!(f, "read-only"),
            WorkspaceAccess::ReadWrite => write!(f, "read-write"),
        }
    }
}

impl FromStr for WorkspaceAccess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ro" | "read-only" => Ok(WorkspaceAccess::ReadOnly),
            "rw" | "read-write" => Ok(WorkspaceAccess::ReadWrite),
            other => Err(format!(
                "invalid workspace access '{}': expected one of ro, rw, read-only, read-write",
                other
            )),
        }
    }
}

/// Mapping rule between one sandbox's container view and its host directory.
///
/// Owned by whatever provisions the sandbox. Values handed out by
/// [`SessionContextCache`](crate::SessionContextCache) are shared copies and
/// are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    /// Absolute host-side root of the workspace
    pub workspace_dir: String,
    /// Absolute container-side root, e.g. `/workspace`
    pub container_workdir: String,
    pub workspace_access: WorkspaceAccess,
}

impl WorkspaceInfo {
    pub fn new(
        workspace_dir: impl Into<String>,
        container_workdir: impl Into<String>,
        workspace_access: WorkspaceAccess,
    ) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            container_workdir: container_workdir.into(),
            workspace_access,
        }
    }

    /// Whether `path` falls under the container prefix and would be translated.
    ///
    /// This is a plain string prefix test, so `/workspace2` counts as being
    /// under `/workspace`.
    pub fn contains_container_path(&self, path: &str) -> bool {
        path.starts_with(self.container_workdir.as_str())
    }

    /// Translate a container path to the host path backing it.
    ///
    /// Paths outside the container prefix are returned as-is.
    pub fn to_host_path(&self, path: &str) -> String {
        match path.strip_prefix(self.container_workdir.as_str()) {
            Some(rest) => crate::translate::join_host_path(&self.workspace_dir, rest),
            None => path.to_string(),
        }
    }
}
