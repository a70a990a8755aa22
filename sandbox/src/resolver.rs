//! Boundary to whatever provisions sandboxes and knows their workspace layout.

use crate::workspace::WorkspaceInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Resolves the sandbox workspace, if any, behind a session.
///
/// Implementations may be slow (they typically inspect sandbox state or
/// configuration), which is why results are memoized by
/// [`SessionContextCache`](crate::SessionContextCache).
#[async_trait]
pub trait WorkspaceResolver: Send + Sync {
    /// Configuration handed through untouched on every call
    type Config: Send + Sync;

    /// Look up the workspace for `session_key`.
    ///
    /// `Ok(None)` means the session is known to run without a sandbox.
    async fn resolve_workspace(
        &self,
        config: &Self::Config,
        session_key: &str,
    ) -> Result<Option<WorkspaceInfo>>;
}

/// Resolver backed by a fixed session table.
///
/// Sessions missing from the table resolve to "no sandbox".
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    sessions: HashMap<String, WorkspaceInfo>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a session table from a JSON object keyed by session key.
    ///
    /// ```json
    /// { "agent:main": { "workspaceDir": "/opt/sb/agent-main", "containerWorkdir": "/workspace", "workspaceAccess": "rw" } }
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session table '{}'", path.display()))?;
        let sessions: HashMap<String, WorkspaceInfo> = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid session table '{}'", path.display()))?;
        Ok(Self { sessions })
    }

    pub fn insert(&mut self, session_key: impl Into<String>, workspace: WorkspaceInfo) {
        self.sessions.insert(session_key.into(), workspace);
    }

    pub fn with_session(mut self, session_key: impl Into<String>, workspace: WorkspaceInfo) -> Self {
        self.insert(session_key, workspace);
        self
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl WorkspaceResolver for StaticResolver {
    type Config = ();

    async fn resolve_workspace(
        &self,
        _config: &(),
        session_key: &str,
    ) -> Result<Option<WorkspaceInfo>> {
        Ok(self.sessions.get(session_key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::WorkspaceAccess;
    use std::io::Write;

    #[tokio::test]
    async fn test_static_resolver_lookup() {
        let ws = WorkspaceInfo::new("/opt/sb/a", "/workspace", WorkspaceAccess::ReadOnly);
        let resolver = StaticResolver::new().with_session("a", ws.clone());

        assert_eq!(resolver.resolve_workspace(&(), "a").await.unwrap(), Some(ws));
        assert_eq!(resolver.resolve_workspace(&(), "b").await.unwrap(), None);
        assert_eq!(resolver.len(), 1);
    }

    #[tokio::test]
    async fn test_static_resolver_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"agent:main":{{"workspaceDir":"/opt/sb/agent-main","containerWorkdir":"/workspace","workspaceAccess":"rw"}}}}"#
        )
        .unwrap();

        let resolver = StaticResolver::from_file(file.path()).unwrap();
        let ws = resolver
            .resolve_workspace(&(), "agent:main")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ws.workspace_dir, "/opt/sb/agent-main");
        assert_eq!(ws.workspace_access, WorkspaceAccess::ReadWrite);
    }

    #[test]
    fn test_static_resolver_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = StaticResolver::from_file(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid session table"));

        assert!(StaticResolver::from_file("/nonexistent/sessions.json").is_err());
    }
}
